//! The rolling XOR checksum that guards each CFDATA block.

/// Computes the CAB checksum of `bytes`, chained onto `seed`.
///
/// The seed is split into four lanes which whole 4-byte words are XORed
/// into bytewise; a partial trailing word folds in reversed, per the CAB
/// specification. Chaining is associative across 4-byte-aligned prefixes,
/// which is how the CFDATA validation seeds the payload pass with the
/// checksum of the two length fields.
pub fn calculate(bytes: &[u8], seed: u32) -> u32 {
    let mut csum = seed.to_le_bytes();
    let mut words = bytes.chunks_exact(4);
    for word in &mut words {
        for (lane, &byte) in csum.iter_mut().zip(word) {
            *lane ^= byte;
        }
    }
    let tail = words.remainder();
    for (index, &byte) in tail.iter().enumerate() {
        csum[tail.len() - 1 - index] ^= byte;
    }
    u32::from_le_bytes(csum)
}

#[cfg(test)]
mod tests {
    use super::calculate;

    #[test]
    fn empty_checksum() {
        assert_eq!(calculate(&[], 0), 0);
    }

    #[test]
    fn simple_checksums() {
        let seed = calculate(b"\x0e\0\x0e\0", 0);
        assert_eq!(calculate(b"Hello, world!\n", seed), 0x7f2e1a4c);

        let seed = calculate(b"\x1d\0\x1d\0", 0);
        assert_eq!(
            calculate(b"Hello, world!\nSee you later!\n", seed),
            0x3509541a
        );
    }

    #[test]
    fn checksum_from_cab_spec() {
        // This comes from the example cabinet file found in the CAB spec.
        let seed = calculate(b"\x97\0\x97\0", 0);
        let payload: &[u8] = b"#include <stdio.h>\r\n\r\n\
              void main(void)\r\n{\r\n    \
              printf(\"Hello, world!\\n\");\r\n}\r\n\
              #include <stdio.h>\r\n\r\n\
              void main(void)\r\n{\r\n    \
              printf(\"Welcome!\\n\");\r\n}\r\n\r\n";
        assert_eq!(calculate(payload, seed), 0x30a65abd);
    }

    #[test]
    fn single_bit_flip_changes_checksum() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let baseline = calculate(data, 0);
        for index in 0..data.len() {
            let mut copy = data.to_vec();
            copy[index] ^= 0x10;
            assert_ne!(calculate(&copy, 0), baseline, "byte {index}");
        }
    }

    #[test]
    fn tail_bytes_fold_in_reversed() {
        // One, two, and three trailing bytes land in distinct lanes.
        assert_eq!(calculate(&[0xab], 0), 0x0000_00ab);
        assert_eq!(calculate(&[0xab, 0xcd], 0), 0x0000_abcd);
        assert_eq!(calculate(&[0xab, 0xcd, 0xef], 0), 0x00ab_cdef);
    }
}
