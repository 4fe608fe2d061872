use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::consts;
use crate::error::{CabError, Result};
use crate::saver::StreamSaver;
use crate::source::CabSource;

/// The fixed CFHEADER record at the start of every cabinet.
#[derive(Debug, Clone)]
pub struct CabHeader {
    pub(crate) cabinet_size: u32,
    pub(crate) first_file_offset: u32,
    pub(crate) minor_version: u8,
    pub(crate) major_version: u8,
    pub(crate) num_folders: u16,
    pub(crate) num_files: u16,
    pub(crate) flags: u16,
    pub(crate) set_id: u16,
    pub(crate) cabinet_index: u16,
    pub(crate) header_reserve_size: u16,
    pub(crate) folder_reserve_size: u8,
    pub(crate) data_reserve_size: u8,
}

impl CabHeader {
    /// Returns the total size of the cabinet file, in bytes, as declared
    /// by the header.
    pub fn cabinet_size(&self) -> u32 {
        self.cabinet_size
    }

    /// Returns the cabinet set ID (an arbitrary number used to group
    /// together a set of cabinets).
    pub fn cabinet_set_id(&self) -> u16 {
        self.set_id
    }

    /// Returns this cabinet's (zero-based) index within its cabinet set.
    pub fn cabinet_set_index(&self) -> u16 {
        self.cabinet_index
    }

    /// Returns the format version as `(major, minor)`.
    pub fn version(&self) -> (u8, u8) {
        (self.major_version, self.minor_version)
    }

    /// Returns the number of folders declared by the header.
    pub fn num_folders(&self) -> u16 {
        self.num_folders
    }

    /// Returns the number of files declared by the header.
    pub fn num_files(&self) -> u16 {
        self.num_files
    }
}

pub(crate) fn parse_header<R: Read, S: StreamSaver>(
    source: &mut CabSource<R>,
    saver: &mut S,
) -> Result<CabHeader> {
    let read_err = |err| CabError::from_record_read(err, "CFHEADER");

    let signature = source.read_u32::<LittleEndian>().map_err(read_err)?;
    if signature != consts::FILE_SIGNATURE {
        corrupt!("not a cabinet file (invalid file signature)");
    }
    let _reserved1 = source.read_u32::<LittleEndian>().map_err(read_err)?;
    let cabinet_size = source.read_u32::<LittleEndian>().map_err(read_err)?;
    if cabinet_size > consts::MAX_TOTAL_CAB_SIZE {
        corrupt!(
            "cabinet total size field is too large \
             ({} bytes; max is {} bytes)",
            cabinet_size,
            consts::MAX_TOTAL_CAB_SIZE
        );
    }
    let _reserved2 = source.read_u32::<LittleEndian>().map_err(read_err)?;
    let first_file_offset =
        source.read_u32::<LittleEndian>().map_err(read_err)?;
    let _reserved3 = source.read_u32::<LittleEndian>().map_err(read_err)?;
    let minor_version = source.read_u8().map_err(read_err)?;
    let major_version = source.read_u8().map_err(read_err)?;
    if major_version > consts::VERSION_MAJOR
        || major_version == consts::VERSION_MAJOR
            && minor_version > consts::VERSION_MINOR
    {
        unsupported!(
            "version {}.{} cabinet files",
            major_version,
            minor_version
        );
    }
    let num_folders = source.read_u16::<LittleEndian>().map_err(read_err)?;
    let num_files = source.read_u16::<LittleEndian>().map_err(read_err)?;
    let flags = source.read_u16::<LittleEndian>().map_err(read_err)?;
    let set_id = source.read_u16::<LittleEndian>().map_err(read_err)?;
    let cabinet_index = source.read_u16::<LittleEndian>().map_err(read_err)?;

    if (flags & (consts::FLAG_PREV_CABINET | consts::FLAG_NEXT_CABINET)) != 0 {
        unsupported!("spanned (multi-disk) cabinets");
    }

    let mut header_reserve_size = 0u16;
    let mut folder_reserve_size = 0u8;
    let mut data_reserve_size = 0u8;
    if (flags & consts::FLAG_RESERVE_PRESENT) != 0 {
        header_reserve_size =
            source.read_u16::<LittleEndian>().map_err(read_err)?;
        folder_reserve_size = source.read_u8().map_err(read_err)?;
        data_reserve_size = source.read_u8().map_err(read_err)?;
    }

    // The per-cabinet reserved area belongs to whoever built the cabinet;
    // offer it to the saver, otherwise skip it unread.
    if header_reserve_size > 0 {
        let len = header_reserve_size as usize;
        if saver.wants_reserved_area(len) {
            let mut data = vec![0u8; len];
            source.read_exact(&mut data).map_err(read_err)?;
            saver.save_reserved_area(&data);
        } else {
            source.skip(header_reserve_size as u64)?;
        }
    }

    debug!(
        cabinet_size,
        num_folders, num_files, set_id, "parsed cabinet header"
    );
    Ok(CabHeader {
        cabinet_size,
        first_file_offset,
        minor_version,
        major_version,
        num_folders,
        num_files,
        flags,
        set_id,
        cabinet_index,
        header_reserve_size,
        folder_reserve_size,
        data_reserve_size,
    })
}
