use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::checksum;
use crate::error::{CabError, Result};
use crate::source::CabSource;

/// The header of one CFDATA block, read just ahead of its payload.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CfDataRecord {
    pub(crate) checksum: u32,
    pub(crate) compressed_size: u16,
    pub(crate) uncompressed_size: u16,
}

impl CfDataRecord {
    /// Reads the record header and its compressed payload into the front
    /// of `buffer`.  The payload must fit the working buffer, and any
    /// per-block reserved bytes are skipped uninterpreted.
    pub(crate) fn read<R: Read>(
        source: &mut CabSource<R>,
        buffer: &mut [u8],
        data_reserve_size: u8,
    ) -> Result<CfDataRecord> {
        let read_err = |err| CabError::from_record_read(err, "CFDATA");
        let checksum = source.read_u32::<LittleEndian>().map_err(read_err)?;
        let compressed_size =
            source.read_u16::<LittleEndian>().map_err(read_err)?;
        let uncompressed_size =
            source.read_u16::<LittleEndian>().map_err(read_err)?;
        if compressed_size as usize > buffer.len() {
            corrupt!(
                "CFDATA block of {} compressed bytes exceeds the {} byte \
                 working buffer",
                compressed_size,
                buffer.len()
            );
        }
        if data_reserve_size > 0 {
            source.skip(data_reserve_size as u64)?;
        }
        source
            .read_exact(&mut buffer[..compressed_size as usize])
            .map_err(read_err)?;
        Ok(CfDataRecord { checksum, compressed_size, uncompressed_size })
    }

    /// Checks the stored checksum against the payload bytes.  The
    /// checksum covers a 4-byte pseudo-header built from the two length
    /// fields, then the compressed payload.  A stored value of zero means
    /// the block carries no checksum.
    pub(crate) fn validate_checksum(&self, payload: &[u8]) -> bool {
        if self.checksum == 0 {
            return true;
        }
        let mut pseudo_header = [0u8; 4];
        pseudo_header[..2].copy_from_slice(&self.compressed_size.to_le_bytes());
        pseudo_header[2..]
            .copy_from_slice(&self.uncompressed_size.to_le_bytes());
        let seed = checksum::calculate(&pseudo_header, 0);
        checksum::calculate(&payload[..self.compressed_size as usize], seed)
            == self.checksum
    }
}
