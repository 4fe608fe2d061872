//! Cabinet parsing and extraction.

use std::io::{self, Read};

use tracing::debug;

use crate::decompress::CabDecompressor;
use crate::error::Result;
use crate::file::{parse_file_entry, CabFileEntry, FileEntries};
use crate::folder::{parse_folder_entry, CabFolderEntry, FolderEntries};
use crate::header::{parse_header, CabHeader};
use crate::saver::{DiscardSaver, StreamSaver};
use crate::source::CabSource;

/// A cabinet read from a forward-only byte source.
///
/// Constructing a `Cabinet` parses all of its metadata (header, folder
/// table, file table); [`extract`](Cabinet::extract) then makes a single
/// pass over the data blocks.
pub struct Cabinet<R> {
    source: CabSource<R>,
    header: CabHeader,
    folders: Vec<CabFolderEntry>,
    files: Vec<CabFileEntry>,
}

impl<R: Read> Cabinet<R> {
    /// Opens a cabinet, discarding any per-cabinet reserved area.
    pub fn new(reader: R) -> Result<Cabinet<R>> {
        Cabinet::with_saver(reader, &mut DiscardSaver)
    }

    /// Opens a cabinet, offering the per-cabinet reserved area (if any)
    /// to `saver`.
    pub fn with_saver<S: StreamSaver>(
        reader: R,
        saver: &mut S,
    ) -> Result<Cabinet<R>> {
        let mut source = CabSource::new(reader);
        let header = parse_header(&mut source, saver)?;

        let mut folders = Vec::with_capacity(header.num_folders as usize);
        for _ in 0..header.num_folders {
            folders.push(parse_folder_entry(
                &mut source,
                header.folder_reserve_size as usize,
            )?);
        }

        source.seek_to(header.first_file_offset as u64)?;
        let mut files = Vec::with_capacity(header.num_files as usize);
        for _ in 0..header.num_files {
            let file = parse_file_entry(&mut source)?;
            if file.folder_index >= header.num_folders {
                corrupt!(
                    "file {:?} names folder {} (cabinet has {})",
                    file.name(),
                    file.folder_index,
                    header.num_folders
                );
            }
            files.push(file);
        }
        group_files_by_folder(&mut folders, &files);
        debug!(
            folders = folders.len(),
            files = files.len(),
            "parsed cabinet tables"
        );
        Ok(Cabinet { source, header, folders, files })
    }

    /// Returns the cabinet header.
    pub fn header(&self) -> &CabHeader {
        &self.header
    }

    /// Returns an iterator over the folder entries in this cabinet.
    pub fn folders(&self) -> FolderEntries<'_> {
        FolderEntries { iter: self.folders.iter(), files: &self.files }
    }

    /// Returns an iterator over all file entries in this cabinet, in
    /// stored order.
    pub fn files(&self) -> FileEntries<'_> {
        FileEntries { iter: self.files.iter() }
    }

    /// Extracts the cabinet's contents in a single pass, asking `saver`
    /// for a sink per file.  Files whose sink is `None` are decompressed
    /// into a discarding sink only when that is needed to reach a later
    /// wanted file in the same folder.
    pub fn extract<S: StreamSaver>(mut self, saver: &mut S) -> Result<()> {
        let mut engine = CabDecompressor::new(self.header.data_reserve_size);
        extract_files(
            &mut self.source,
            &self.folders,
            &self.files,
            &mut engine,
            saver,
        )?;
        Ok(())
    }
}

/// Computes each folder's contiguous slice of the file table, for the
/// folder views.  Well-formed cabinets store files grouped by folder in
/// folder order; extraction enforces that ordering separately.
fn group_files_by_folder(
    folders: &mut [CabFolderEntry],
    files: &[CabFileEntry],
) {
    let mut counts = vec![0usize; folders.len()];
    for file in files {
        counts[file.folder_index as usize] += 1;
    }
    let mut start = 0;
    for (folder, count) in folders.iter_mut().zip(counts) {
        folder.file_idx_start = start;
        folder.files_count = count;
        start += count;
    }
}

/// Progress through the current folder's uncompressed byte stream.
///
/// `planned` counts the bytes of every file seen so far in this folder;
/// `consumed` counts the bytes actually pulled through the engine.  The
/// difference is the stretch of unwanted files to skip past before the
/// next wanted one.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FolderCursor {
    pub(crate) folder: i64,
    pub(crate) consumed: u64,
    pub(crate) planned: u64,
    pub(crate) need_init: bool,
}

impl FolderCursor {
    fn start() -> FolderCursor {
        FolderCursor { folder: -1, consumed: 0, planned: 0, need_init: true }
    }

    fn enter_folder(&mut self, index: u16, num_folders: usize) -> Result<()> {
        if i64::from(index) != self.folder + 1
            || usize::from(index) >= num_folders
        {
            corrupt!(
                "file table jumps from folder {} to folder {}",
                self.folder,
                index
            );
        }
        self.folder = i64::from(index);
        self.consumed = 0;
        self.planned = 0;
        self.need_init = true;
        Ok(())
    }
}

pub(crate) fn extract_files<R: Read, S: StreamSaver>(
    source: &mut CabSource<R>,
    folders: &[CabFolderEntry],
    files: &[CabFileEntry],
    engine: &mut CabDecompressor,
    saver: &mut S,
) -> Result<FolderCursor> {
    let mut cursor = FolderCursor::start();
    for file in files {
        if i64::from(file.folder_index) != cursor.folder {
            cursor.enter_folder(file.folder_index, folders.len())?;
        }
        let size = u64::from(file.uncompressed_size());

        if let Some(mut sink) = saver.open_stream(file) {
            if cursor.need_init {
                let folder = &folders[cursor.folder as usize];
                source.seek_to(u64::from(folder.first_data_block_offset))?;
                engine.initialize(folder.compression_type)?;
                cursor.need_init = false;
            }
            if cursor.consumed != cursor.planned {
                // Decode past the unwanted files in between; their bytes
                // still have to pass through the history window.
                engine.read(
                    source,
                    cursor.planned - cursor.consumed,
                    &mut io::sink(),
                )?;
                cursor.consumed = cursor.planned;
            }
            debug!(name = file.name(), size, "extracting file");
            engine.read(source, size, &mut sink)?;
            saver.close_stream(sink, file);
            cursor.consumed += size;
        }
        cursor.planned += size;
    }
    Ok(cursor)
}
