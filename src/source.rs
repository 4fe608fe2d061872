use std::io::{self, Read, Seek, SeekFrom};

use crate::error::Result;

/// Wraps the cabinet byte source, tracking the absolute read position.
///
/// The source only moves forward: `seek_to` skips ahead by reading and
/// discarding, and seeking backwards is a usage error. A single
/// mark/reset checkpoint is available when the underlying reader happens
/// to be seekable.
pub struct CabSource<R> {
    inner: R,
    position: u64,
    mark: Option<Mark>,
}

#[derive(Clone, Copy)]
struct Mark {
    position: u64,
    limit: u64,
}

impl<R: Read> CabSource<R> {
    pub fn new(inner: R) -> CabSource<R> {
        CabSource { inner, position: 0, mark: None }
    }

    /// The number of bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads and discards exactly `count` bytes.
    pub fn skip(&mut self, count: u64) -> Result<()> {
        let skipped = io::copy(&mut self.by_ref().take(count), &mut io::sink())?;
        if skipped < count {
            corrupt!("EOF while skipping {} bytes", count - skipped);
        }
        Ok(())
    }

    /// Moves forward to the absolute offset `location`.
    pub fn seek_to(&mut self, location: u64) -> Result<()> {
        if location < self.position {
            usage!(
                "cannot seek backwards (at {}, asked for {})",
                self.position,
                location
            );
        }
        if location > self.position {
            self.skip(location - self.position)?;
        }
        Ok(())
    }
}

impl<R: Read + Seek> CabSource<R> {
    /// Records the current position as the one checkpoint `reset` can
    /// return to. `limit` bounds how far past the mark a reset remains
    /// valid; callers pass the declared cabinet size.
    pub fn mark(&mut self, limit: u64) {
        self.mark = Some(Mark { position: self.position, limit });
    }

    /// Returns to the marked position.
    pub fn reset(&mut self) -> Result<()> {
        let mark = match self.mark {
            Some(mark) => mark,
            None => usage!("reset without a prior mark"),
        };
        if self.position > mark.position + mark.limit {
            usage!("mark invalidated ({} bytes past its limit)",
                self.position - mark.position - mark.limit);
        }
        self.inner.seek(SeekFrom::Start(mark.position))?;
        self.position = mark.position;
        Ok(())
    }
}

impl<R: Read> Read for CabSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = self.inner.read(buf)?;
        self.position += count as u64;
        Ok(count)
    }
}
