//! Decoding of bounded byte vectors sent by the constrained program.
//!
//! The caller cannot ship a variable-length array, so it sends its
//! fixed-capacity backing storage together with a separate length field.
//! Only the leading `len mod (capacity + 1)` entries are meaningful.  The
//! reduction is part of the caller's contract and must be reproduced exactly:
//! an out-of-range length wraps, it is never clamped or rejected.

use crate::error::OracleError;
use crate::protocol::ForeignCallParam;

/// Borrowed view over the two positional inputs that make up a bounded vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedVecInput<'a> {
    storage: &'a [String],
    declared_len: &'a str,
}

impl<'a> BoundedVecInput<'a> {
    /// Pairs a storage array with its declared length.
    pub fn new(storage: &'a [String], declared_len: &'a str) -> Self {
        Self {
            storage,
            declared_len,
        }
    }

    /// Reads `inputs[0]` as storage and `inputs[1]` as the declared length.
    pub fn from_inputs(inputs: &'a [ForeignCallParam]) -> Result<Self, OracleError> {
        let storage = inputs
            .first()
            .ok_or_else(|| OracleError::malformed("missing bounded vec storage in inputs[0]"))?
            .as_array()
            .ok_or_else(|| OracleError::malformed("inputs[0] must be an array of hex bytes"))?;
        let declared_len = inputs
            .get(1)
            .ok_or_else(|| OracleError::malformed("missing bounded vec length in inputs[1]"))?
            .as_single()
            .ok_or_else(|| OracleError::malformed("inputs[1] must be a single hex string"))?;
        Ok(Self::new(storage, declared_len))
    }

    /// Fixed capacity of the backing storage.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Declared length reduced into `0..=capacity`.
    pub fn effective_len(&self) -> Result<usize, OracleError> {
        effective_len(self.declared_len, self.capacity())
    }

    /// Decodes the logically valid prefix of the storage into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, OracleError> {
        let len = self.effective_len()?;
        self.storage[..len]
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                parse_hex_byte(entry)
                    .map_err(|err| OracleError::malformed(format!("storage[{idx}]: {err}")))
            })
            .collect()
    }
}

/// Reduces a hex-encoded length modulo `capacity + 1`.
///
/// The reduction is streamed over the digits, so lengths wider than any
/// machine integer are handled exactly.
pub fn effective_len(declared_len: &str, capacity: usize) -> Result<usize, OracleError> {
    let digits = hex_digits(declared_len)
        .map_err(|err| OracleError::malformed(format!("length: {err}")))?;
    let modulus = (capacity as u128)
        .checked_add(1)
        .ok_or_else(|| OracleError::malformed("storage capacity overflow"))?;
    let mut rem = 0u128;
    for digit in digits {
        rem = (rem * 16 + u128::from(digit)) % modulus;
    }
    // rem < capacity + 1, so it fits back into usize.
    Ok(rem as usize)
}

/// Parses one storage entry into a byte, accepting zero-padded field encodings.
pub fn parse_hex_byte(entry: &str) -> Result<u8, String> {
    let mut value = 0u16;
    for digit in hex_digits(entry)? {
        value = value * 16 + u16::from(digit);
        if value > u16::from(u8::MAX) {
            return Err(format!("value {entry} does not fit in a byte"));
        }
    }
    Ok(value as u8)
}

fn hex_digits(raw: &str) -> Result<Vec<u8>, String> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if body.is_empty() {
        return Err(format!("empty hex value {raw:?}"));
    }
    body.chars()
        .map(|c| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| format!("invalid hex digit {c:?} in {raw:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn storage(bytes: &[u8]) -> Vec<String> {
        bytes.iter().map(|b| format!("0x{b:02x}")).collect()
    }

    #[test]
    fn zero_length_decodes_to_empty() {
        let s = storage(b"abc");
        assert!(BoundedVecInput::new(&s, "0x0").decode().unwrap().is_empty());
    }

    #[test]
    fn capacity_plus_one_wraps_to_zero() {
        let s = storage(b"abc");
        let input = BoundedVecInput::new(&s, "0x4");
        assert_eq!(input.effective_len().unwrap(), 0);
        assert!(input.decode().unwrap().is_empty());
    }

    #[test]
    fn large_length_wraps_instead_of_clamping() {
        let s = storage(b"abc");
        // 0x6 mod 4 == 2
        assert_eq!(BoundedVecInput::new(&s, "0x6").decode().unwrap(), b"ab");
        // 2^256 mod 4 == 0, far wider than any native integer.
        let huge = format!("0x1{}", "0".repeat(64));
        assert_eq!(effective_len(&huge, 3).unwrap(), 0);
        // (2^256 + 1) mod 4 == 1
        let huge_plus_one = format!("0x1{}1", "0".repeat(63));
        assert_eq!(effective_len(&huge_plus_one, 3).unwrap(), 1);
    }

    #[test]
    fn empty_storage_always_yields_empty() {
        let s: Vec<String> = Vec::new();
        assert_eq!(effective_len("0xff", 0).unwrap(), 0);
        assert!(BoundedVecInput::new(&s, "0x7").decode().unwrap().is_empty());
    }

    #[test]
    fn accepts_zero_padded_field_elements_and_bare_hex() {
        let padded = format!("0x{}61", "0".repeat(62));
        assert_eq!(parse_hex_byte(&padded).unwrap(), 0x61);
        assert_eq!(parse_hex_byte("ff").unwrap(), 0xff);
        assert_eq!(parse_hex_byte("0X0A").unwrap(), 0x0a);
        assert_eq!(effective_len("3", 3).unwrap(), 3);
    }

    #[test]
    fn rejects_malformed_hex_instead_of_coercing() {
        assert!(parse_hex_byte("0xzz").is_err());
        assert!(parse_hex_byte("0x").is_err());
        assert!(parse_hex_byte("").is_err());
        assert!(parse_hex_byte("0x100").is_err());
        assert!(matches!(
            effective_len("0xg1", 3),
            Err(OracleError::MalformedInput(_))
        ));

        let s = vec!["0x61".to_string(), "nope".to_string()];
        let err = BoundedVecInput::new(&s, "0x2").decode().unwrap_err();
        assert!(err.to_string().contains("storage[1]"));
    }

    #[test]
    fn entries_past_effective_len_are_not_inspected() {
        let s = vec!["0x61".to_string(), "garbage".to_string()];
        assert_eq!(BoundedVecInput::new(&s, "0x1").decode().unwrap(), b"a");
    }

    #[test]
    fn from_inputs_checks_shape() {
        let good = vec![
            ForeignCallParam::Array(storage(b"xy")),
            ForeignCallParam::Single("0x1".into()),
        ];
        let input = BoundedVecInput::from_inputs(&good).unwrap();
        assert_eq!(input.capacity(), 2);
        assert_eq!(input.decode().unwrap(), b"x");

        let swapped = vec![
            ForeignCallParam::Single("0x1".into()),
            ForeignCallParam::Array(storage(b"xy")),
        ];
        assert!(BoundedVecInput::from_inputs(&swapped).is_err());
        assert!(BoundedVecInput::from_inputs(&good[..1]).is_err());
        assert!(BoundedVecInput::from_inputs(&[]).is_err());
    }

    proptest! {
        #[test]
        fn effective_len_stays_within_capacity(
            bytes in prop::collection::vec(any::<u8>(), 0..64),
            len in any::<u64>(),
        ) {
            let s = storage(&bytes);
            let declared = format!("0x{len:x}");
            let input = BoundedVecInput::new(&s, &declared);
            let eff = input.effective_len().unwrap();
            let expected = (len % (bytes.len() as u64 + 1)) as usize;
            prop_assert_eq!(eff, expected);
            prop_assert!(eff <= bytes.len());
            prop_assert_eq!(input.decode().unwrap(), bytes[..eff].to_vec());
        }
    }
}
