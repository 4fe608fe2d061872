use crate::consts;
use crate::error::Result;

const QUANTUM_LEVEL_MIN: u16 = 1;
const QUANTUM_LEVEL_MAX: u16 = 7;
const QUANTUM_MEMORY_MIN: u16 = 10;
const QUANTUM_MEMORY_MAX: u16 = 21;

const LZX_WINDOW_MIN: u16 = 15;
const LZX_WINDOW_MAX: u16 = 21;

/// The scheme used to compress a folder's data.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum CompressionType {
    /// No compression.
    None,
    /// MSZIP (deflate) compression.  MSZIP is described further in
    /// [MS-MCI](https://msdn.microsoft.com/en-us/library/cc483131.aspx).
    MsZip,
    /// Quantum compression with the given level and memory.  Recognized
    /// but not decodable by this crate.
    Quantum(u16, u16),
    /// LZX compression with the given window parameter (the dictionary is
    /// 2^w bytes).  LZX is described further in
    /// [MS-PATCH](https://msdn.microsoft.com/en-us/library/cc483133.aspx).
    Lzx(u16),
}

impl CompressionType {
    /// Decodes the CFFOLDER compression-method word: the low 4 bits are
    /// the type tag, bits 8-12 the window parameter where one applies.
    pub(crate) fn from_bitfield(bits: u16) -> Result<CompressionType> {
        let ctype = bits & 0x000f;
        if ctype == consts::CTYPE_NONE {
            Ok(CompressionType::None)
        } else if ctype == consts::CTYPE_MSZIP {
            Ok(CompressionType::MsZip)
        } else if ctype == consts::CTYPE_QUANTUM {
            let level = (bits & 0x00f0) >> 4;
            if !(QUANTUM_LEVEL_MIN..=QUANTUM_LEVEL_MAX).contains(&level) {
                corrupt!("invalid Quantum level: 0x{:02x}", level);
            }
            let memory = (bits & 0x1f00) >> 8;
            if !(QUANTUM_MEMORY_MIN..=QUANTUM_MEMORY_MAX).contains(&memory) {
                corrupt!("invalid Quantum memory: 0x{:02x}", memory);
            }
            Ok(CompressionType::Quantum(level, memory))
        } else if ctype == consts::CTYPE_LZX {
            let window = (bits & 0x1f00) >> 8;
            if !(LZX_WINDOW_MIN..=LZX_WINDOW_MAX).contains(&window) {
                corrupt!("invalid LZX window: 0x{:02x}", window);
            }
            Ok(CompressionType::Lzx(window))
        } else {
            unsupported!("unknown compression type: 0x{:04x}", bits);
        }
    }

    /// The window parameter packed next to the type tag; zero for
    /// windowless schemes.
    pub fn window_bits(self) -> u16 {
        match self {
            CompressionType::None => 0,
            CompressionType::MsZip => 0,
            CompressionType::Quantum(_, memory) => memory,
            CompressionType::Lzx(window) => window,
        }
    }

    #[cfg(test)]
    pub(crate) fn to_bitfield(self) -> u16 {
        match self {
            CompressionType::None => consts::CTYPE_NONE,
            CompressionType::MsZip => consts::CTYPE_MSZIP,
            CompressionType::Quantum(level, memory) => {
                consts::CTYPE_QUANTUM | (level << 4) | (memory << 8)
            }
            CompressionType::Lzx(window) => consts::CTYPE_LZX | (window << 8),
        }
    }
}

impl std::fmt::Display for CompressionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            CompressionType::None => write!(f, "NONE"),
            CompressionType::MsZip => write!(f, "MSZIP"),
            CompressionType::Quantum(level, memory) => {
                write!(f, "QUANTUM:{level}/{memory}")
            }
            CompressionType::Lzx(window) => write!(f, "LZX:{window}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompressionType;
    use crate::error::CabError;

    #[test]
    fn compression_type_from_bitfield() {
        assert_eq!(
            CompressionType::from_bitfield(0x0).unwrap(),
            CompressionType::None
        );
        assert_eq!(
            CompressionType::from_bitfield(0x1).unwrap(),
            CompressionType::MsZip
        );
        assert_eq!(
            CompressionType::from_bitfield(0x1472).unwrap(),
            CompressionType::Quantum(7, 20)
        );
        assert_eq!(
            CompressionType::from_bitfield(0x1503).unwrap(),
            CompressionType::Lzx(21)
        );
    }

    #[test]
    fn compression_type_round_trips() {
        for bits in [0x0u16, 0x1, 0x1472, 0x0f03, 0x1503] {
            let ctype = CompressionType::from_bitfield(bits).unwrap();
            assert_eq!(ctype.to_bitfield(), bits);
        }
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let result = CompressionType::from_bitfield(0x0004);
        assert!(matches!(result, Err(CabError::Unsupported(_))));
    }

    #[test]
    fn bad_lzx_window_is_corrupt() {
        let result = CompressionType::from_bitfield(0x0103);
        assert!(matches!(result, Err(CabError::Corrupt(_))));
    }
}
