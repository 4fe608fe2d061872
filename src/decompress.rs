//! The block stream engine: turns a folder's CFDATA blocks back into a
//! continuous uncompressed byte stream.
//!
//! Callers pull arbitrary byte counts with [`CabDecompressor::read`];
//! the engine reads, validates, and decodes whole blocks as needed and
//! serves leftovers from the previous block first.  Skipped stretches
//! are read into a discarding sink rather than seeked over, because the
//! decoder's history window must see every folder byte.

use std::io::{Read, Write};

use lzxd::Lzxd;
use tracing::trace;

use crate::block::CfDataRecord;
use crate::consts::CAB_BLOCK_SIZE;
use crate::ctype::CompressionType;
use crate::error::Result;
use crate::mszip::{MsZipDecoder, MSZIP_MAX_GROWTH};
use crate::source::CabSource;

/// Worst-case growth of a compressed LZX block over `CAB_BLOCK_SIZE`.
const LZX_MAX_GROWTH: usize = 6144;

enum BlockDecoder {
    None,
    MsZip(MsZipDecoder),
    Lzx(Box<Lzxd>),
}

impl BlockDecoder {
    fn max_growth(&self) -> usize {
        match self {
            BlockDecoder::None => 0,
            BlockDecoder::MsZip(_) => MSZIP_MAX_GROWTH,
            BlockDecoder::Lzx(_) => LZX_MAX_GROWTH,
        }
    }
}

fn lzx_window_size(window: u16) -> Result<lzxd::WindowSize> {
    Ok(match window {
        15 => lzxd::WindowSize::KB32,
        16 => lzxd::WindowSize::KB64,
        17 => lzxd::WindowSize::KB128,
        18 => lzxd::WindowSize::KB256,
        19 => lzxd::WindowSize::KB512,
        20 => lzxd::WindowSize::MB1,
        21 => lzxd::WindowSize::MB2,
        _ => corrupt!("invalid LZX window: 0x{:02x}", window),
    })
}

/// Decodes one folder's block stream at a time; `initialize` switches it
/// to the next folder.
pub(crate) struct CabDecompressor {
    method: Option<CompressionType>,
    decoder: BlockDecoder,
    data_reserve_size: u8,
    /// Compressed bytes of the block being decoded.
    read_buffer: Vec<u8>,
    /// Decoded bytes of the most recent block; `offset..offset +
    /// remaining` have not been served yet.
    out_buffer: Vec<u8>,
    offset: usize,
    remaining: usize,
}

impl CabDecompressor {
    pub(crate) fn new(data_reserve_size: u8) -> CabDecompressor {
        CabDecompressor {
            method: None,
            decoder: BlockDecoder::None,
            data_reserve_size,
            read_buffer: Vec::new(),
            out_buffer: vec![0u8; CAB_BLOCK_SIZE],
            offset: 0,
            remaining: 0,
        }
    }

    /// Prepares the engine for a folder compressed with `ctype`.  Reuses
    /// the existing decoder when the method carries over; otherwise the
    /// decoder and working buffer are rebuilt.
    pub(crate) fn initialize(&mut self, ctype: CompressionType) -> Result<()> {
        self.offset = 0;
        self.remaining = 0;
        if self.method == Some(ctype) {
            match self.decoder {
                BlockDecoder::None => {}
                BlockDecoder::MsZip(ref mut decoder) => decoder.reset(),
                BlockDecoder::Lzx(ref mut decoder) => {
                    **decoder = Lzxd::new(lzx_window_size(ctype.window_bits())?)
                }
            }
            return Ok(());
        }
        self.decoder = match ctype {
            CompressionType::None => BlockDecoder::None,
            CompressionType::MsZip => BlockDecoder::MsZip(MsZipDecoder::new()),
            CompressionType::Lzx(window) => {
                BlockDecoder::Lzx(Box::new(Lzxd::new(lzx_window_size(window)?)))
            }
            CompressionType::Quantum(_, _) => {
                unsupported!("Quantum decompression");
            }
        };
        self.read_buffer =
            vec![0u8; CAB_BLOCK_SIZE + self.decoder.max_growth()];
        self.method = Some(ctype);
        Ok(())
    }

    /// Serves the next `size` uncompressed folder bytes into `sink`,
    /// decoding as many blocks as that takes.
    pub(crate) fn read<R: Read, W: Write>(
        &mut self,
        source: &mut CabSource<R>,
        mut size: u64,
        sink: &mut W,
    ) -> Result<()> {
        if self.remaining as u64 >= size {
            let take = size as usize;
            sink.write_all(&self.out_buffer[self.offset..self.offset + take])?;
            self.offset += take;
            self.remaining -= take;
            return Ok(());
        }
        if self.remaining > 0 {
            sink.write_all(
                &self.out_buffer[self.offset..self.offset + self.remaining],
            )?;
            size -= self.remaining as u64;
            self.offset = 0;
            self.remaining = 0;
        }

        while size > 0 {
            let record = CfDataRecord::read(
                source,
                &mut self.read_buffer,
                self.data_reserve_size,
            )?;
            if !record.validate_checksum(&self.read_buffer) {
                corrupt!("invalid CFDATA checksum");
            }
            trace!(
                compressed = record.compressed_size,
                uncompressed = record.uncompressed_size,
                "decoding data block"
            );
            let produced = self.decode_block(&record)?;
            let take = size.min(produced as u64) as usize;
            sink.write_all(&self.out_buffer[..take])?;
            self.offset = take;
            self.remaining = produced - take;
            size -= take as u64;
        }
        Ok(())
    }

    fn decode_block(&mut self, record: &CfDataRecord) -> Result<usize> {
        let compressed = record.compressed_size as usize;
        let uncompressed = record.uncompressed_size as usize;
        if uncompressed > CAB_BLOCK_SIZE {
            corrupt!(
                "CFDATA block declares {} uncompressed bytes (max is {})",
                uncompressed,
                CAB_BLOCK_SIZE
            );
        }
        match self.decoder {
            BlockDecoder::None => {
                if compressed != uncompressed {
                    corrupt!(
                        "stored block sizes disagree ({} vs {})",
                        compressed,
                        uncompressed
                    );
                }
                self.out_buffer[..uncompressed]
                    .copy_from_slice(&self.read_buffer[..compressed]);
            }
            BlockDecoder::MsZip(ref mut decoder) => {
                decoder.decompress(
                    &self.read_buffer[..compressed],
                    &mut self.out_buffer[..uncompressed],
                )?;
            }
            BlockDecoder::Lzx(ref mut decoder) => {
                let decoded = match decoder
                    .decompress_next(&self.read_buffer[..compressed], uncompressed)
                {
                    Ok(decoded) => decoded,
                    Err(err) => corrupt!("LZX decoding failed: {}", err),
                };
                if decoded.len() != uncompressed {
                    corrupt!(
                        "LZX block produced {} bytes (expected {})",
                        decoded.len(),
                        uncompressed
                    );
                }
                self.out_buffer[..uncompressed].copy_from_slice(decoded);
            }
        }
        Ok(uncompressed)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::CabDecompressor;
    use crate::checksum;
    use crate::ctype::CompressionType;
    use crate::error::CabError;
    use crate::source::CabSource;

    /// Assembles one CFDATA record with a valid checksum.
    fn data_block(payload: &[u8], uncompressed_size: u16) -> Vec<u8> {
        let mut pseudo_header = [0u8; 4];
        pseudo_header[..2]
            .copy_from_slice(&(payload.len() as u16).to_le_bytes());
        pseudo_header[2..].copy_from_slice(&uncompressed_size.to_le_bytes());
        let seed = checksum::calculate(&pseudo_header, 0);
        let sum = checksum::calculate(payload, seed);
        let mut block = Vec::new();
        block.extend_from_slice(&sum.to_le_bytes());
        block.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        block.extend_from_slice(&uncompressed_size.to_le_bytes());
        block.extend_from_slice(payload);
        block
    }

    fn source_of(blocks: &[Vec<u8>]) -> CabSource<Cursor<Vec<u8>>> {
        let bytes = blocks.concat();
        CabSource::new(Cursor::new(bytes))
    }

    #[test]
    fn read_across_stored_blocks() {
        let blocks = [data_block(b"Hello, ", 7), data_block(b"world!", 6)];
        let mut source = source_of(&blocks);
        let mut engine = CabDecompressor::new(0);
        engine.initialize(CompressionType::None).unwrap();
        let mut output = Vec::new();
        engine.read(&mut source, 13, &mut output).unwrap();
        assert_eq!(output, b"Hello, world!");
    }

    #[test]
    fn partial_reads_resume_within_a_block() {
        let blocks = [data_block(b"Hello, world!", 13)];
        let mut source = source_of(&blocks);
        let mut engine = CabDecompressor::new(0);
        engine.initialize(CompressionType::None).unwrap();
        let mut first = Vec::new();
        engine.read(&mut source, 5, &mut first).unwrap();
        assert_eq!(first, b"Hello");
        let mut second = Vec::new();
        engine.read(&mut source, 8, &mut second).unwrap();
        assert_eq!(second, b", world!");
    }

    #[test]
    fn skipped_bytes_go_to_a_discarding_sink() {
        let blocks = [data_block(b"skip me: payload", 16)];
        let mut source = source_of(&blocks);
        let mut engine = CabDecompressor::new(0);
        engine.initialize(CompressionType::None).unwrap();
        engine.read(&mut source, 9, &mut io::sink()).unwrap();
        let mut output = Vec::new();
        engine.read(&mut source, 7, &mut output).unwrap();
        assert_eq!(output, b"payload");
    }

    #[test]
    fn checksum_mismatch_is_corrupt() {
        let mut block = data_block(b"Hello", 5);
        let last = block.len() - 1;
        block[last] ^= 0xff;
        let mut source = source_of(&[block]);
        let mut engine = CabDecompressor::new(0);
        engine.initialize(CompressionType::None).unwrap();
        let result = engine.read(&mut source, 5, &mut io::sink());
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn stored_size_mismatch_is_corrupt() {
        let blocks = [data_block(b"Hello", 9)];
        let mut source = source_of(&blocks);
        let mut engine = CabDecompressor::new(0);
        engine.initialize(CompressionType::None).unwrap();
        let result = engine.read(&mut source, 9, &mut io::sink());
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let blocks = [data_block(b"Hello", 5)];
        let mut source = source_of(&blocks);
        let mut engine = CabDecompressor::new(0);
        engine.initialize(CompressionType::None).unwrap();
        let result = engine.read(&mut source, 64, &mut io::sink());
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn quantum_is_unsupported() {
        let mut engine = CabDecompressor::new(0);
        let result = engine.initialize(CompressionType::Quantum(3, 16));
        assert!(matches!(result, Err(CabError::Unsupported(_))));
    }

    #[test]
    fn read_mszip_blocks() {
        let mut compressor =
            flate2::Compress::new(flate2::Compression::best(), false);
        let text = lipsum::lipsum(100);
        let mut payload = Vec::with_capacity(0xffff);
        payload.extend_from_slice(b"CK");
        compressor
            .compress_vec(
                text.as_bytes(),
                &mut payload,
                flate2::FlushCompress::Finish,
            )
            .unwrap();
        let blocks = [data_block(&payload, text.len() as u16)];
        let mut source = source_of(&blocks);
        let mut engine = CabDecompressor::new(0);
        engine.initialize(CompressionType::MsZip).unwrap();
        let mut output = Vec::new();
        engine.read(&mut source, text.len() as u64, &mut output).unwrap();
        assert_eq!(output, text.as_bytes());
    }

    #[test]
    fn initialize_resets_between_folders() {
        let text = lipsum::lipsum(50);
        let mut blocks = Vec::new();
        for _ in 0..2 {
            let mut compressor =
                flate2::Compress::new(flate2::Compression::best(), false);
            let mut payload = Vec::with_capacity(0xffff);
            payload.extend_from_slice(b"CK");
            compressor
                .compress_vec(
                    text.as_bytes(),
                    &mut payload,
                    flate2::FlushCompress::Finish,
                )
                .unwrap();
            blocks.push(data_block(&payload, text.len() as u16));
        }
        let mut source = source_of(&blocks);
        let mut engine = CabDecompressor::new(0);
        for _ in 0..2 {
            engine.initialize(CompressionType::MsZip).unwrap();
            let mut output = Vec::new();
            engine.read(&mut source, text.len() as u64, &mut output).unwrap();
            assert_eq!(output, text.as_bytes());
        }
    }
}
