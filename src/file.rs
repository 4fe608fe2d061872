use std::io::Read;
use std::slice;

use byteorder::{LittleEndian, ReadBytesExt};
use time::PrimitiveDateTime;

use crate::consts;
use crate::datetime::datetime_from_bits;
use crate::error::{CabError, Result};
use crate::string::read_null_terminated_name;

/// An iterator over the file entries in a folder.
#[derive(Clone)]
pub struct FileEntries<'a> {
    pub(crate) iter: slice::Iter<'a, CabFileEntry>,
}

/// Metadata about one file stored in a cabinet.
#[derive(Debug, Clone)]
pub struct CabFileEntry {
    name: String,
    datetime: Option<PrimitiveDateTime>,
    uncompressed_size: u32,
    attributes: u16,
    pub(crate) folder_index: u16,
    pub(crate) folder_offset: u32,
}

impl<'a> Iterator for FileEntries<'a> {
    type Item = &'a CabFileEntry;

    fn next(&mut self) -> Option<&'a CabFileEntry> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a> ExactSizeIterator for FileEntries<'a> {}

impl CabFileEntry {
    /// Returns the name of the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the total size of the file when decompressed, in bytes.
    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    /// Returns the uncompressed byte offset of this file within its
    /// folder.
    pub fn folder_offset(&self) -> u32 {
        self.folder_offset
    }

    /// Returns the index of the folder holding this file's data.
    pub fn folder_index(&self) -> u16 {
        self.folder_index
    }

    /// Returns the datetime for this file.  According to the CAB spec,
    /// this "is typically considered the 'last modified' time in local
    /// time, but the actual definition is application-defined."
    ///
    /// Returns [`None`] if the stored fields don't name a valid
    /// date/time.
    pub fn datetime(&self) -> Option<PrimitiveDateTime> {
        self.datetime
    }

    /// Returns true if this file has the "read-only" attribute set.
    pub fn is_read_only(&self) -> bool {
        (self.attributes & consts::ATTR_READ_ONLY) != 0
    }

    /// Returns true if this file has the "hidden" attribute set.
    pub fn is_hidden(&self) -> bool {
        (self.attributes & consts::ATTR_HIDDEN) != 0
    }

    /// Returns true if this file has the "system file" attribute set.
    pub fn is_system(&self) -> bool {
        (self.attributes & consts::ATTR_SYSTEM) != 0
    }

    /// Returns true if this file has the "archive" (modified since last
    /// backup) attribute set.
    pub fn is_archive(&self) -> bool {
        (self.attributes & consts::ATTR_ARCH) != 0
    }

    /// Returns true if this file has the "execute after extraction"
    /// attribute set.
    pub fn is_exec(&self) -> bool {
        (self.attributes & consts::ATTR_EXEC) != 0
    }

    /// Returns true if this file has the "name is UTF" attribute set.
    pub fn is_name_utf(&self) -> bool {
        (self.attributes & consts::ATTR_NAME_IS_UTF) != 0
    }
}

pub(crate) fn parse_file_entry<R: Read>(
    reader: &mut R,
) -> Result<CabFileEntry> {
    let read_err = |err| CabError::from_record_read(err, "CFFILE");
    let uncompressed_size =
        reader.read_u32::<LittleEndian>().map_err(read_err)?;
    let folder_offset = reader.read_u32::<LittleEndian>().map_err(read_err)?;
    let folder_index = reader.read_u16::<LittleEndian>().map_err(read_err)?;
    let date = reader.read_u16::<LittleEndian>().map_err(read_err)?;
    let time = reader.read_u16::<LittleEndian>().map_err(read_err)?;
    let datetime = datetime_from_bits(date, time);
    let attributes = reader.read_u16::<LittleEndian>().map_err(read_err)?;
    let is_utf8 = (attributes & consts::ATTR_NAME_IS_UTF) != 0;
    let name = read_null_terminated_name(reader, is_utf8)?;
    Ok(CabFileEntry {
        name,
        datetime,
        uncompressed_size,
        attributes,
        folder_index,
        folder_offset,
    })
}

#[cfg(test)]
pub(crate) fn test_entry(name: &str, uncompressed_size: u32) -> CabFileEntry {
    CabFileEntry {
        name: name.to_string(),
        datetime: None,
        uncompressed_size,
        attributes: 0,
        folder_index: 0,
        folder_offset: 0,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::parse_file_entry;
    use crate::error::CabError;

    #[test]
    fn parse_plain_file_entry() {
        let bytes: &[u8] =
            b"\x0e\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\x01\0hi.txt\0";
        let entry = parse_file_entry(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(entry.name(), "hi.txt");
        assert_eq!(entry.uncompressed_size(), 14);
        assert_eq!(entry.folder_offset(), 0);
        assert_eq!(entry.folder_index(), 0);
        assert!(entry.is_read_only());
        assert!(!entry.is_name_utf());

        let dt = entry.datetime().unwrap();
        assert_eq!(dt.year(), 1997);
        assert_eq!(dt.month(), time::Month::March);
        assert_eq!(dt.day(), 12);
        assert_eq!(dt.hour(), 11);
        assert_eq!(dt.minute(), 13);
        assert_eq!(dt.second(), 52);
    }

    #[test]
    fn parse_utf_file_entry() {
        let bytes: &[u8] =
            b"\x09\0\0\0\0\0\0\0\0\0\x6c\x22\xba\x59\xa0\0\xe2\x98\x83.txt\0";
        let entry = parse_file_entry(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(entry.name(), "\u{2603}.txt");
        assert!(entry.is_name_utf());
        assert!(entry.is_archive());
    }

    #[test]
    fn truncated_file_entry_is_corrupt() {
        let bytes: &[u8] = b"\x0e\0\0\0\0\0\0\0\0\0";
        let result = parse_file_entry(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }
}
