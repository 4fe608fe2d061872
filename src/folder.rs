use std::io::Read;
use std::slice;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ctype::CompressionType;
use crate::error::{CabError, Result};
use crate::file::{CabFileEntry, FileEntries};

/// An iterator over the folder entries in a cabinet.
#[derive(Clone)]
pub struct FolderEntries<'a> {
    pub(crate) iter: slice::Iter<'a, CabFolderEntry>,
    pub(crate) files: &'a [CabFileEntry],
}

/// One folder's metadata together with the files stored in it.
pub struct FolderEntry<'a> {
    entry: &'a CabFolderEntry,
    files: &'a [CabFileEntry],
}

/// Metadata about one folder in a cabinet: a contiguous run of CFDATA
/// blocks decompressed with a single shared window.
#[derive(Debug, Clone)]
pub struct CabFolderEntry {
    pub(crate) first_data_block_offset: u32,
    pub(crate) num_data_blocks: u16,
    pub(crate) compression_type: CompressionType,
    pub(crate) file_idx_start: usize,
    pub(crate) files_count: usize,
}

impl CabFolderEntry {
    /// Returns the scheme used to compress this folder's data.
    pub fn compression_type(&self) -> CompressionType {
        self.compression_type
    }

    /// Returns the number of CFDATA blocks used to store this folder's
    /// data.
    pub fn num_data_blocks(&self) -> u16 {
        self.num_data_blocks
    }

    /// Returns the absolute offset of this folder's first CFDATA block.
    pub fn first_data_block_offset(&self) -> u32 {
        self.first_data_block_offset
    }
}

impl<'a> Iterator for FolderEntries<'a> {
    type Item = FolderEntry<'a>;

    fn next(&mut self) -> Option<FolderEntry<'a>> {
        let entry = self.iter.next()?;
        let files = &self.files
            [entry.file_idx_start..entry.file_idx_start + entry.files_count];
        Some(FolderEntry { entry, files })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a> ExactSizeIterator for FolderEntries<'a> {}

impl<'a> FolderEntry<'a> {
    /// Returns the scheme used to compress this folder's data.
    pub fn compression_type(&self) -> CompressionType {
        self.entry.compression_type()
    }

    /// Returns the number of CFDATA blocks used to store this folder's
    /// data.
    pub fn num_data_blocks(&self) -> u16 {
        self.entry.num_data_blocks()
    }

    /// Returns an iterator over the file entries in this folder.
    pub fn file_entries(&self) -> FileEntries<'a> {
        FileEntries { iter: self.files.iter() }
    }
}

pub(crate) fn parse_folder_entry<R: Read>(
    reader: &mut R,
    reserve_size: usize,
) -> Result<CabFolderEntry> {
    let read_err = |err| CabError::from_record_read(err, "CFFOLDER");
    let first_data_block_offset =
        reader.read_u32::<LittleEndian>().map_err(read_err)?;
    let num_data_blocks = reader.read_u16::<LittleEndian>().map_err(read_err)?;
    let compression_bits =
        reader.read_u16::<LittleEndian>().map_err(read_err)?;
    let compression_type = CompressionType::from_bitfield(compression_bits)?;
    if reserve_size > 0 {
        let mut reserve = vec![0u8; reserve_size];
        reader.read_exact(&mut reserve).map_err(read_err)?;
    }
    Ok(CabFolderEntry {
        first_data_block_offset,
        num_data_blocks,
        compression_type,
        file_idx_start: 0,
        files_count: 0,
    })
}
