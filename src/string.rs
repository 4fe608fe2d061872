use std::io::Read;

use byteorder::ReadBytesExt;

use crate::consts;
use crate::error::{CabError, Result};

/// Reads a null-terminated file name of at most
/// [`MAX_STRING_SIZE`](consts::MAX_STRING_SIZE) raw bytes (terminator
/// included) and decodes it according to the entry's UTF attribute.
pub(crate) fn read_null_terminated_name<R: Read>(
    reader: &mut R,
    is_utf8: bool,
) -> Result<String> {
    let mut bytes = Vec::<u8>::with_capacity(consts::MAX_STRING_SIZE);
    loop {
        let byte = reader
            .read_u8()
            .map_err(|err| CabError::from_record_read(err, "CFFILE name"))?;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
        if bytes.len() == consts::MAX_STRING_SIZE {
            corrupt!("CFFILE name not null-terminated");
        }
    }
    if is_utf8 {
        decode_utf_name(&bytes)
    } else {
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }
}

/// Decodes a name flagged as UTF, accepting 1- to 3-byte sequences only.
/// Lead bytes of 4-byte sequences and out-of-range continuation bytes are
/// corruption.
fn decode_utf_name(bytes: &[u8]) -> Result<String> {
    let mut name = String::with_capacity(bytes.len());
    let mut iter = bytes.iter();
    while let Some(&lead) = iter.next() {
        let code = match lead {
            0x00..=0x7f => u32::from(lead),
            0x80..=0xbf => corrupt!("invalid UTF lead byte in CFFILE name"),
            0xc0..=0xdf => {
                let low = continuation(iter.next())?;
                (u32::from(lead & 0x1f) << 6) | low
            }
            0xe0..=0xef => {
                let mid = continuation(iter.next())?;
                let low = continuation(iter.next())?;
                (u32::from(lead & 0x0f) << 12) | (mid << 6) | low
            }
            0xf0..=0xff => corrupt!("invalid UTF lead byte in CFFILE name"),
        };
        match char::from_u32(code) {
            Some(ch) => name.push(ch),
            None => corrupt!("invalid UTF code point in CFFILE name"),
        }
    }
    Ok(name)
}

fn continuation(byte: Option<&u8>) -> Result<u32> {
    match byte {
        Some(&byte) if (0x80..=0xbf).contains(&byte) => {
            Ok(u32::from(byte & 0x3f))
        }
        _ => corrupt!("invalid UTF continuation byte in CFFILE name"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::read_null_terminated_name;
    use crate::error::CabError;

    #[test]
    fn ascii_name() {
        let mut cursor = Cursor::new(b"a.txt\0trailing".to_vec());
        let name = read_null_terminated_name(&mut cursor, false).unwrap();
        assert_eq!(name, "a.txt");
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn ascii_name_is_trimmed() {
        let mut cursor = Cursor::new(b"  hi.txt \0".to_vec());
        let name = read_null_terminated_name(&mut cursor, false).unwrap();
        assert_eq!(name, "hi.txt");
    }

    #[test]
    fn utf_name() {
        let mut cursor = Cursor::new(b"\xe2\x98\x83.txt\0".to_vec());
        let name = read_null_terminated_name(&mut cursor, true).unwrap();
        assert_eq!(name, "\u{2603}.txt");
    }

    #[test]
    fn utf_name_with_bad_continuation_byte() {
        let mut cursor = Cursor::new(b"\xc3\xff.txt\0".to_vec());
        let result = read_null_terminated_name(&mut cursor, true);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn utf_name_with_four_byte_sequence() {
        let mut cursor = Cursor::new(b"\xf0\x9f\x92\xbe\0".to_vec());
        let result = read_null_terminated_name(&mut cursor, true);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn unterminated_name() {
        let mut cursor = Cursor::new(vec![b'x'; 300]);
        let result = read_null_terminated_name(&mut cursor, false);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }

    #[test]
    fn name_truncated_by_eof() {
        let mut cursor = Cursor::new(b"partial".to_vec());
        let result = read_null_terminated_name(&mut cursor, false);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }
}
