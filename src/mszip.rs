//! MSZIP block decoding.
//!
//! Each CFDATA block of an MSZIP folder holds a two-byte "CK" signature
//! followed by a complete deflate stream.  The 32 KiB history window is
//! shared across all blocks of a folder, so a match in one block may copy
//! bytes produced by an earlier block; the window therefore lives in the
//! decoder and survives between [`MsZipDecoder::decompress`] calls.

use crate::consts::CAB_BLOCK_SIZE;
use crate::error::Result;

const MSZIP_SIGNATURE: [u8; 2] = *b"CK";

/// Worst-case growth of a compressed MSZIP block over `CAB_BLOCK_SIZE`.
pub(crate) const MSZIP_MAX_GROWTH: usize = 28;

const WINDOW_SIZE: usize = CAB_BLOCK_SIZE;
const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// Number of symbols / direct-lookup index width for each alphabet.
const LITLEN_SYMBOLS: usize = 288;
const LITLEN_TABLE_BITS: u32 = 9;
const DIST_SYMBOLS: usize = 32;
const DIST_TABLE_BITS: u32 = 7;
const CLEN_SYMBOLS: usize = 19;
const CLEN_TABLE_BITS: u32 = 7;

const END_OF_BLOCK: u16 = 256;
const MAX_CODE_LEN: usize = 16;

/// Base copy lengths for length codes 257..=285.
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59,
    67, 83, 99, 115, 131, 163, 195, 227, 258,
];
/// Extra bits consumed after each length code.
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4,
    5, 5, 5, 5, 0,
];
/// Base match distances for distance codes 0..=29.
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513,
    769, 1025, 1537, 2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
/// Extra bits consumed after each distance code.
const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10,
    10, 11, 11, 12, 12, 13, 13,
];
/// The order code-length-alphabet lengths are stored in.
const CLEN_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

// ========================================================================= //

/// An LSB-first bit reader over one block's compressed bytes.  Every
/// refill is bounds-checked so a malformed stream can never read past the
/// block.
struct BitReader<'a> {
    input: &'a [u8],
    pos: usize,
    bits: u32,
    count: u32,
}

impl<'a> BitReader<'a> {
    fn new(input: &'a [u8]) -> BitReader<'a> {
        BitReader { input, pos: 0, bits: 0, count: 0 }
    }

    fn take(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 16);
        while self.count < count {
            if self.pos >= self.input.len() {
                corrupt!("MSZIP stream ran past the end of its block");
            }
            self.bits |= u32::from(self.input[self.pos]) << self.count;
            self.pos += 1;
            self.count += 8;
        }
        let value = self.bits & ((1 << count) - 1);
        self.bits >>= count;
        self.count -= count;
        Ok(value)
    }

    /// Discards buffered bits up to the next byte boundary (stored
    /// blocks are byte-aligned).
    fn align_to_byte(&mut self) {
        self.bits = 0;
        self.count = 0;
    }

    fn read_aligned_u16(&mut self) -> Result<u16> {
        debug_assert_eq!(self.count, 0);
        if self.pos + 2 > self.input.len() {
            corrupt!("MSZIP stored block header truncated");
        }
        let value = u16::from_le_bytes([
            self.input[self.pos],
            self.input[self.pos + 1],
        ]);
        self.pos += 2;
        Ok(value)
    }

    fn copy_aligned(&mut self, out: &mut BlockWriter<'_, '_>, len: usize)
        -> Result<()> {
        debug_assert_eq!(self.count, 0);
        if self.pos + len > self.input.len() {
            corrupt!("MSZIP stored block data truncated");
        }
        for index in 0..len {
            out.push_literal(self.input[self.pos + index])?;
        }
        self.pos += len;
        Ok(())
    }
}

// ========================================================================= //

/// A canonical Huffman decoding table: a direct lookup array for codes up
/// to `table_bits`, with longer codes resolved through an arena of
/// two-child internal nodes.
struct HuffmanTable {
    table_bits: u32,
    /// Code length per symbol, also consulted to learn how many bits a
    /// direct-lookup hit consumed.
    lengths: Vec<u8>,
    lookup: Vec<Entry>,
    nodes: Vec<Node>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Entry {
    Empty,
    Leaf(u16),
    Node(u32),
}

#[derive(Clone, Copy)]
struct Node {
    zero: Entry,
    one: Entry,
}

impl HuffmanTable {
    fn new(symbols: usize, table_bits: u32) -> HuffmanTable {
        HuffmanTable {
            table_bits,
            lengths: vec![0; symbols],
            lookup: vec![Entry::Empty; 1 << table_bits],
            nodes: Vec::new(),
        }
    }

    /// Rebuilds the table from `self.lengths` (canonical code
    /// assignment, shortest codes first, ties by symbol order).
    fn build(&mut self) -> Result<()> {
        for entry in self.lookup.iter_mut() {
            *entry = Entry::Empty;
        }
        self.nodes.clear();

        let mut length_count = [0u32; MAX_CODE_LEN + 1];
        for &len in &self.lengths {
            length_count[len as usize] += 1;
        }
        if length_count[0] as usize == self.lengths.len() {
            // A table with no codes at all is legal (e.g. an unused
            // distance alphabet); decoding through it is not.
            return Ok(());
        }

        // First canonical code of each length.
        let mut next_code = [0u32; MAX_CODE_LEN + 1];
        let mut code = 0u32;
        for len in 1..=MAX_CODE_LEN {
            code = (code + length_count[len - 1]) << 1;
            next_code[len] = code;
        }

        for symbol in 0..self.lengths.len() {
            let len = u32::from(self.lengths[symbol]);
            if len == 0 {
                continue;
            }
            let code = next_code[len as usize];
            next_code[len as usize] += 1;
            if code >> len != 0 {
                corrupt!("MSZIP Huffman code lengths oversubscribed");
            }
            let reversed = reverse_bits(code, len);
            if len <= self.table_bits {
                // Fill every lookup slot whose low bits spell this code.
                let step = 1usize << len;
                let mut index = reversed as usize;
                while index < self.lookup.len() {
                    self.lookup[index] = Entry::Leaf(symbol as u16);
                    index += step;
                }
            } else {
                self.insert_long_code(reversed, len, symbol as u16);
            }
        }
        Ok(())
    }

    /// Threads a code longer than the lookup width through the node
    /// arena, creating internal nodes as needed.
    fn insert_long_code(&mut self, reversed: u32, len: u32, symbol: u16) {
        let root = reversed as usize & (self.lookup.len() - 1);
        let mut slot = Slot::Lookup(root);
        for depth in self.table_bits..len {
            let node = match self.get(slot) {
                Entry::Node(index) => index as usize,
                _ => {
                    let index = self.nodes.len();
                    self.nodes
                        .push(Node { zero: Entry::Empty, one: Entry::Empty });
                    self.set(slot, Entry::Node(index as u32));
                    index
                }
            };
            slot = if (reversed >> depth) & 1 == 0 {
                Slot::Zero(node)
            } else {
                Slot::One(node)
            };
        }
        self.set(slot, Entry::Leaf(symbol));
    }

    fn get(&self, slot: Slot) -> Entry {
        match slot {
            Slot::Lookup(index) => self.lookup[index],
            Slot::Zero(index) => self.nodes[index].zero,
            Slot::One(index) => self.nodes[index].one,
        }
    }

    fn set(&mut self, slot: Slot, entry: Entry) {
        match slot {
            Slot::Lookup(index) => self.lookup[index] = entry,
            Slot::Zero(index) => self.nodes[index].zero = entry,
            Slot::One(index) => self.nodes[index].one = entry,
        }
    }

    /// Decodes one symbol from the bit reader.
    fn read_symbol(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        // Peek as many bits as the lookup wants without consuming; the
        // stream may end inside the peek window, so pad with zeros.
        let mut peek = reader.bits;
        let mut have = reader.count;
        let mut pos = reader.pos;
        while have < self.table_bits && pos < reader.input.len() {
            peek |= u32::from(reader.input[pos]) << have;
            pos += 1;
            have += 8;
        }
        let index = (peek as usize) & (self.lookup.len() - 1);
        match self.lookup[index] {
            Entry::Leaf(symbol) => {
                let len = u32::from(self.lengths[symbol as usize]);
                let _ = reader.take(len)?;
                Ok(symbol)
            }
            Entry::Node(node) => {
                let _ = reader.take(self.table_bits)?;
                let mut index = node as usize;
                loop {
                    let bit = reader.take(1)?;
                    let entry = if bit == 0 {
                        self.nodes[index].zero
                    } else {
                        self.nodes[index].one
                    };
                    match entry {
                        Entry::Leaf(symbol) => return Ok(symbol),
                        Entry::Node(next) => index = next as usize,
                        Entry::Empty => {
                            corrupt!("MSZIP stream names an unassigned code")
                        }
                    }
                }
            }
            Entry::Empty => corrupt!("MSZIP stream names an unassigned code"),
        }
    }
}

#[derive(Clone, Copy)]
enum Slot {
    Lookup(usize),
    Zero(usize),
    One(usize),
}

fn reverse_bits(code: u32, len: u32) -> u32 {
    code.reverse_bits() >> (32 - len)
}

// ========================================================================= //

/// Writes decoded bytes into the caller's output while mirroring them
/// into the shared history window.
struct BlockWriter<'a, 'w> {
    output: &'a mut [u8],
    produced: usize,
    window: &'w mut [u8; WINDOW_SIZE],
    window_pos: usize,
}

impl<'a, 'w> BlockWriter<'a, 'w> {
    fn push_literal(&mut self, byte: u8) -> Result<()> {
        if self.produced >= self.output.len() {
            corrupt!("MSZIP stream overruns the declared uncompressed size");
        }
        self.output[self.produced] = byte;
        self.produced += 1;
        self.window[self.window_pos] = byte;
        self.window_pos = (self.window_pos + 1) & WINDOW_MASK;
        Ok(())
    }

    fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        // Copies go byte-by-byte so overlapping matches replicate.
        let mut from = (self.window_pos.wrapping_sub(distance)) & WINDOW_MASK;
        for _ in 0..length {
            let byte = self.window[from];
            from = (from + 1) & WINDOW_MASK;
            self.push_literal(byte)?;
        }
        Ok(())
    }
}

// ========================================================================= //

/// Stateful MSZIP decoder for one folder's block stream.
pub(crate) struct MsZipDecoder {
    window: Box<[u8; WINDOW_SIZE]>,
    window_pos: usize,
    litlen: HuffmanTable,
    dist: HuffmanTable,
    clen: HuffmanTable,
}

impl MsZipDecoder {
    pub(crate) fn new() -> MsZipDecoder {
        MsZipDecoder {
            window: Box::new([0u8; WINDOW_SIZE]),
            window_pos: 0,
            litlen: HuffmanTable::new(LITLEN_SYMBOLS, LITLEN_TABLE_BITS),
            dist: HuffmanTable::new(DIST_SYMBOLS, DIST_TABLE_BITS),
            clen: HuffmanTable::new(CLEN_SYMBOLS, CLEN_TABLE_BITS),
        }
    }

    /// Drops the per-folder coding context.  The window contents are
    /// left in place: deflate never emits a distance reaching before the
    /// start of its own stream, so stale bytes are unreachable.
    pub(crate) fn reset(&mut self) {
        for len in self.litlen.lengths.iter_mut() {
            *len = 0;
        }
        for len in self.dist.lengths.iter_mut() {
            *len = 0;
        }
        for len in self.clen.lengths.iter_mut() {
            *len = 0;
        }
        self.window_pos = 0;
    }

    /// Decodes one "CK" block, producing exactly `output.len()` bytes.
    pub(crate) fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        if input.len() < 2 || input[..2] != MSZIP_SIGNATURE {
            corrupt!("MSZIP block signature missing");
        }
        let mut reader = BitReader::new(&input[2..]);
        let mut writer = BlockWriter {
            output,
            produced: 0,
            window: &mut *self.window,
            window_pos: self.window_pos,
        };

        while writer.produced < writer.output.len() {
            // The final-block bit is read and ignored; the declared
            // uncompressed size bounds the loop instead.
            let _final = reader.take(1)?;
            match reader.take(2)? {
                0 => Self::stored_block(&mut reader, &mut writer)?,
                1 => {
                    Self::fixed_tables(&mut self.litlen, &mut self.dist)?;
                    Self::compressed_block(
                        &self.litlen,
                        &self.dist,
                        &mut reader,
                        &mut writer,
                    )?;
                }
                2 => {
                    Self::dynamic_tables(
                        &mut self.litlen,
                        &mut self.dist,
                        &mut self.clen,
                        &mut reader,
                    )?;
                    Self::compressed_block(
                        &self.litlen,
                        &self.dist,
                        &mut reader,
                        &mut writer,
                    )?;
                }
                _ => corrupt!("MSZIP stream has reserved block type 3"),
            }
        }
        self.window_pos = writer.window_pos;
        Ok(())
    }

    fn stored_block(
        reader: &mut BitReader<'_>,
        writer: &mut BlockWriter<'_, '_>,
    ) -> Result<()> {
        reader.align_to_byte();
        let len = reader.read_aligned_u16()?;
        let nlen = reader.read_aligned_u16()?;
        if len != !nlen {
            corrupt!("MSZIP stored block length check failed");
        }
        reader.copy_aligned(writer, len as usize)
    }

    /// Installs the fixed tables defined by the deflate spec.
    fn fixed_tables(
        litlen: &mut HuffmanTable,
        dist: &mut HuffmanTable,
    ) -> Result<()> {
        for (symbol, len) in litlen.lengths.iter_mut().enumerate() {
            *len = match symbol {
                0..=143 => 8,
                144..=255 => 9,
                256..=279 => 7,
                _ => 8,
            };
        }
        for len in dist.lengths.iter_mut() {
            *len = 5;
        }
        litlen.build()?;
        dist.build()
    }

    /// Reads the inline table description of a dynamic block and builds
    /// the literal/length and distance tables from it.
    fn dynamic_tables(
        litlen: &mut HuffmanTable,
        dist: &mut HuffmanTable,
        clen: &mut HuffmanTable,
        reader: &mut BitReader<'_>,
    ) -> Result<()> {
        let hlit = reader.take(5)? as usize + 257;
        let hdist = reader.take(5)? as usize + 1;
        let hclen = reader.take(4)? as usize + 4;
        if hlit > LITLEN_SYMBOLS || hdist > DIST_SYMBOLS {
            corrupt!("MSZIP dynamic table counts out of range");
        }

        for len in clen.lengths.iter_mut() {
            *len = 0;
        }
        for &position in CLEN_ORDER.iter().take(hclen) {
            clen.lengths[position] = reader.take(3)? as u8;
        }
        clen.build()?;

        // The two alphabets' lengths are run-length coded as one
        // sequence; repeat codes may not cross the combined end.
        let total = hlit + hdist;
        let mut lengths = vec![0u8; total];
        let mut filled = 0;
        while filled < total {
            let symbol = clen.read_symbol(reader)?;
            match symbol {
                0..=15 => {
                    lengths[filled] = symbol as u8;
                    filled += 1;
                }
                16 => {
                    if filled == 0 {
                        corrupt!("MSZIP repeat code with nothing to repeat");
                    }
                    let previous = lengths[filled - 1];
                    let run = reader.take(2)? as usize + 3;
                    if filled + run > total {
                        corrupt!("MSZIP code-length run overflows the table");
                    }
                    for _ in 0..run {
                        lengths[filled] = previous;
                        filled += 1;
                    }
                }
                17 | 18 => {
                    let run = if symbol == 17 {
                        reader.take(3)? as usize + 3
                    } else {
                        reader.take(7)? as usize + 11
                    };
                    if filled + run > total {
                        corrupt!("MSZIP code-length run overflows the table");
                    }
                    filled += run;
                }
                _ => corrupt!("MSZIP invalid code-length symbol"),
            }
        }
        if lengths[END_OF_BLOCK as usize] == 0 {
            corrupt!("MSZIP dynamic block has no end-of-block code");
        }

        litlen.lengths.fill(0);
        litlen.lengths[..hlit].copy_from_slice(&lengths[..hlit]);
        dist.lengths.fill(0);
        dist.lengths[..hdist].copy_from_slice(&lengths[hlit..]);
        litlen.build()?;
        dist.build()
    }

    /// Decodes literals and matches until the end-of-block symbol.
    fn compressed_block(
        litlen: &HuffmanTable,
        dist: &HuffmanTable,
        reader: &mut BitReader<'_>,
        writer: &mut BlockWriter<'_, '_>,
    ) -> Result<()> {
        loop {
            let symbol = litlen.read_symbol(reader)?;
            if symbol < END_OF_BLOCK {
                writer.push_literal(symbol as u8)?;
                continue;
            }
            if symbol == END_OF_BLOCK {
                return Ok(());
            }
            let length_code = (symbol - 257) as usize;
            if length_code >= LENGTH_BASE.len() {
                corrupt!("MSZIP invalid length code {}", symbol);
            }
            let extra = u32::from(LENGTH_EXTRA[length_code]);
            let length =
                LENGTH_BASE[length_code] as usize + reader.take(extra)? as usize;

            let dist_code = dist.read_symbol(reader)? as usize;
            if dist_code >= DIST_BASE.len() {
                corrupt!("MSZIP invalid distance code {}", dist_code);
            }
            let extra = u32::from(DIST_EXTRA[dist_code]);
            let distance =
                DIST_BASE[dist_code] as usize + reader.take(extra)? as usize;
            writer.copy_match(distance, length)?;
        }
    }
}

// ========================================================================= //

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{MsZipDecoder, WINDOW_SIZE};
    use crate::error::CabError;

    /// Compresses `chunks` the way a CAB writer would: one deflate
    /// stream per 32 KiB block, flushed at block boundaries, prefixed
    /// with "CK".
    fn mszip_blocks(data: &[u8]) -> Vec<(usize, Vec<u8>)> {
        let mut compressor =
            flate2::Compress::new(flate2::Compression::best(), false);
        let mut blocks = Vec::new();
        let chunks: Vec<&[u8]> = data.chunks(WINDOW_SIZE).collect();
        for (index, chunk) in chunks.iter().enumerate() {
            let last = index + 1 == chunks.len();
            let mut out = Vec::with_capacity(0xffff);
            out.write_all(b"CK").unwrap();
            let flush = if last {
                flate2::FlushCompress::Finish
            } else {
                flate2::FlushCompress::Sync
            };
            compressor.compress_vec(chunk, &mut out, flush).unwrap();
            blocks.push((chunk.len(), out));
        }
        blocks
    }

    fn decode_all(blocks: Vec<(usize, Vec<u8>)>) -> Vec<u8> {
        let mut decoder = MsZipDecoder::new();
        let mut output = Vec::new();
        for (size, block) in blocks {
            let mut out = vec![0u8; size];
            decoder.decompress(&block, &mut out).unwrap();
            output.extend_from_slice(&out);
        }
        output
    }

    #[test]
    fn read_compressed_data() {
        let input: &[u8] = b"CK%\xcc\xd1\t\x031\x0c\x04\xd1V\xb6\x80#\x95\xa4\
              \t\xc5\x12\xc7\x82e\xfb,\xa9\xff\x18\xee{x\xf3\x9d\xdb\x1c\\Q\
              \x0e\x9d}n\x04\x13\xe2\x96\x17\xda\x1ca--kC\x94\x8b\xd18nX\xe7\
              \x89az\x00\x8c\x15>\x15i\xbe\x0e\xe6hTj\x8dD%\xba\xfc\xce\x1e\
              \x96\xef\xda\xe0r\x0f\x81t>%\x9f?\x12]-\x87";
        let expected: &[u8] =
            b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed \
              do eiusmod tempor incididunt ut labore et dolore magna aliqua.";
        let mut decoder = MsZipDecoder::new();
        let mut output = vec![0u8; expected.len()];
        decoder.decompress(input, &mut output).unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn missing_signature() {
        let mut decoder = MsZipDecoder::new();
        let mut output = vec![0u8; 4];
        let result = decoder.decompress(b"XY\x01\x02", &mut output);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn stored_block() {
        // 01 = final, type 0; then byte-aligned LEN/NLEN and raw bytes.
        let mut block = b"CK\x01".to_vec();
        block.extend_from_slice(&5u16.to_le_bytes());
        block.extend_from_slice(&(!5u16).to_le_bytes());
        block.extend_from_slice(b"hello");
        let mut decoder = MsZipDecoder::new();
        let mut output = vec![0u8; 5];
        decoder.decompress(&block, &mut output).unwrap();
        assert_eq!(&output, b"hello");
    }

    #[test]
    fn stored_block_with_bad_complement() {
        let mut block = b"CK\x01".to_vec();
        block.extend_from_slice(&5u16.to_le_bytes());
        block.extend_from_slice(&0u16.to_le_bytes());
        block.extend_from_slice(b"hello");
        let mut decoder = MsZipDecoder::new();
        let mut output = vec![0u8; 5];
        let result = decoder.decompress(&block, &mut output);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn truncated_stream() {
        let input: &[u8] = b"CK%\xcc\xd1\t\x031";
        let mut decoder = MsZipDecoder::new();
        let mut output = vec![0u8; 128];
        let result = decoder.decompress(input, &mut output);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn fixed_huffman_stream() {
        // flate2 picks fixed tables for tiny inputs at this level.
        let mut compressor =
            flate2::Compress::new(flate2::Compression::fast(), false);
        let mut block = Vec::with_capacity(64);
        block.extend_from_slice(b"CK");
        compressor
            .compress_vec(b"abcabc", &mut block, flate2::FlushCompress::Finish)
            .unwrap();
        let mut decoder = MsZipDecoder::new();
        let mut output = vec![0u8; 6];
        decoder.decompress(&block, &mut output).unwrap();
        assert_eq!(&output, b"abcabc");
    }

    #[test]
    fn round_trip_text() {
        let text = lipsum::lipsum(3000);
        let blocks = mszip_blocks(text.as_bytes());
        assert_eq!(decode_all(blocks), text.as_bytes());
    }

    #[test]
    fn round_trip_repeating_data() {
        let data: Vec<u8> = (0..WINDOW_SIZE * 3 + 1000)
            .map(|index| (index % 251) as u8)
            .collect();
        let blocks = mszip_blocks(&data);
        assert!(blocks.len() > 3);
        assert_eq!(decode_all(blocks), data);
    }

    #[test]
    fn round_trip_random_data() {
        use rand::{RngCore, SeedableRng};
        let mut data = vec![0u8; WINDOW_SIZE + 1000];
        rand::rngs::SmallRng::seed_from_u64(0x5eed).fill_bytes(&mut data);
        let blocks = mszip_blocks(&data);
        assert_eq!(decode_all(blocks), data);
    }

    #[test]
    fn window_carries_across_blocks() {
        // The second block is mostly matches against bytes the first
        // block produced, so decoding it alone only works if the window
        // survived.
        let text = lipsum::lipsum(20000);
        let data = text.as_bytes();
        assert!(data.len() > WINDOW_SIZE + 4000);
        let blocks = mszip_blocks(data);
        assert_eq!(decode_all(blocks), data);
    }

    #[test]
    fn reset_starts_a_fresh_folder() {
        let text = lipsum::lipsum(500);
        let blocks = mszip_blocks(text.as_bytes());
        let mut decoder = MsZipDecoder::new();
        for _ in 0..2 {
            for (size, block) in &blocks {
                let mut out = vec![0u8; *size];
                decoder.decompress(block, &mut out).unwrap();
                assert_eq!(out, text.as_bytes());
            }
            decoder.reset();
        }
    }
}
