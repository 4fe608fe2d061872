//! Sink selection for extraction.
//!
//! The extractor asks its [`StreamSaver`] for a sink per file entry; a
//! `None` answer means the file's bytes are decompressed into a
//! discarding sink to keep the folder's history window intact, but are
//! not delivered anywhere.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::file::CabFileEntry;
use crate::filter::FileFilter;

/// Chooses where each extracted file's bytes go.
pub trait StreamSaver {
    type Sink: Write;

    /// Asked once, before parsing continues past the header, when the
    /// cabinet declares a per-cabinet reserved area of `len` bytes.
    /// Returning false leaves the area unread.
    fn wants_reserved_area(&mut self, _len: usize) -> bool {
        false
    }

    /// Receives the reserved area bytes when
    /// [`wants_reserved_area`](StreamSaver::wants_reserved_area)
    /// returned true.
    fn save_reserved_area(&mut self, _data: &[u8]) {}

    /// Returns a sink for this entry's decompressed bytes, or [`None`]
    /// to skip the file.
    fn open_stream(&mut self, entry: &CabFileEntry) -> Option<Self::Sink>;

    /// Takes the sink back once the entry has been fully written to it.
    fn close_stream(&mut self, sink: Self::Sink, entry: &CabFileEntry);
}

/// Declines every file and the reserved area.  Useful for walking a
/// cabinet's metadata without extracting anything.
#[derive(Debug, Default)]
pub struct DiscardSaver;

impl StreamSaver for DiscardSaver {
    type Sink = io::Sink;

    fn open_stream(&mut self, _entry: &CabFileEntry) -> Option<io::Sink> {
        None
    }

    fn close_stream(&mut self, _sink: io::Sink, _entry: &CabFileEntry) {}
}

/// Captures a single file, chosen by case-insensitive name, into memory.
#[derive(Debug)]
pub struct SingleFileSaver {
    name: String,
    data: Option<Vec<u8>>,
}

impl SingleFileSaver {
    pub fn new(name: impl Into<String>) -> SingleFileSaver {
        SingleFileSaver { name: name.into(), data: None }
    }

    /// Returns the captured bytes, if the file was found.
    pub fn into_data(self) -> Option<Vec<u8>> {
        self.data
    }
}

impl StreamSaver for SingleFileSaver {
    type Sink = Vec<u8>;

    fn open_stream(&mut self, entry: &CabFileEntry) -> Option<Vec<u8>> {
        if self.data.is_none()
            && entry.name().eq_ignore_ascii_case(&self.name)
        {
            Some(Vec::with_capacity(entry.uncompressed_size() as usize))
        } else {
            None
        }
    }

    fn close_stream(&mut self, sink: Vec<u8>, _entry: &CabFileEntry) {
        self.data = Some(sink);
    }
}

/// Receives each completed file's bytes from a [`FilteredSaver`].
pub trait FileSink {
    fn save(&mut self, data: &[u8], entry: &CabFileEntry) -> io::Result<()>;
}

/// Buffers each accepted file in memory and hands the finished bytes to
/// a [`FileSink`].  A sink failure is counted and extraction continues.
pub struct FilteredSaver<F, S> {
    filter: F,
    sink: S,
    succeeded: u32,
    failed: u32,
}

impl<F: FileFilter, S: FileSink> FilteredSaver<F, S> {
    pub fn new(filter: F, sink: S) -> FilteredSaver<F, S> {
        FilteredSaver { filter, sink, succeeded: 0, failed: 0 }
    }

    /// Returns the number of files saved without error.
    pub fn succeeded(&self) -> u32 {
        self.succeeded
    }

    /// Returns the number of save attempts that failed.
    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<F: FileFilter, S: FileSink> StreamSaver for FilteredSaver<F, S> {
    type Sink = Vec<u8>;

    fn open_stream(&mut self, entry: &CabFileEntry) -> Option<Vec<u8>> {
        if self.filter.matches(entry) {
            Some(Vec::with_capacity(entry.uncompressed_size() as usize))
        } else {
            None
        }
    }

    fn close_stream(&mut self, sink: Vec<u8>, entry: &CabFileEntry) {
        match self.sink.save(&sink, entry) {
            Ok(()) => self.succeeded += 1,
            Err(err) => {
                debug!(name = entry.name(), %err, "failed to save file");
                self.failed += 1;
            }
        }
    }
}

/// Writes files under a target directory, translating backslash path
/// separators and creating parent directories as needed.
#[derive(Debug)]
pub struct DirectorySaver {
    root: PathBuf,
}

impl DirectorySaver {
    pub fn new(root: impl Into<PathBuf>) -> DirectorySaver {
        DirectorySaver { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSink for DirectorySaver {
    fn save(&mut self, data: &[u8], entry: &CabFileEntry) -> io::Result<()> {
        let mut path = self.root.clone();
        for component in entry.name().split('\\') {
            path.push(component);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        debug!(path = %path.display(), bytes = data.len(), "saved file");
        Ok(())
    }
}
