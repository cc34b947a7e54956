//! 32-byte word encoding
//!
//! Every field of a signed message is laid out as a big-endian 32-byte word.
//! Addresses are left-padded with 12 zero bytes; integers are full uint256.

use alloy_primitives::{Address, B256, U256};

/// Width of one encoded field
pub const WORD_SIZE: usize = 32;

pub fn encode_address(address: &Address) -> B256 {
    address.into_word()
}

pub fn encode_uint(value: &U256) -> B256 {
    B256::from(*value)
}

/// Concatenates words without any separator or length prefix
#[derive(Debug, Default, Clone)]
pub struct WordWriter {
    buf: Vec<u8>,
}

impl WordWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(words: usize) -> Self {
        Self {
            buf: Vec::with_capacity(words * WORD_SIZE),
        }
    }

    pub fn word(mut self, word: &B256) -> Self {
        self.buf.extend_from_slice(word.as_slice());
        self
    }

    pub fn address(self, address: &Address) -> Self {
        self.word(&encode_address(address))
    }

    pub fn uint(self, value: &U256) -> Self {
        self.word(&encode_uint(value))
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Serde adapter rendering byte vectors as `0x` hex strings
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(trimmed).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_word_is_left_padded() {
        let word = encode_address(&Address::new([0xff; 20]));
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0xff; 20]);
    }

    #[test]
    fn test_integer_words_are_big_endian() {
        let word = encode_uint(&U256::from(1234));
        assert_eq!(&word[30..], &[0x04, 0xd2]);
        assert!(word[..30].iter().all(|b| *b == 0));

        // Values above 128 bits use the whole word
        let word = encode_uint(&U256::MAX);
        assert_eq!(word, B256::repeat_byte(0xff));

        let word = encode_uint(&(U256::from(1) << 255));
        assert_eq!(word[0], 0x80);
        assert!(word[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_writer_concatenates_words() {
        let bytes = WordWriter::new()
            .uint(&U256::from(1))
            .address(&Address::ZERO)
            .word(&B256::ZERO)
            .finish();
        assert_eq!(bytes.len(), 3 * WORD_SIZE);
        assert_eq!(bytes[31], 1);
    }

    #[test]
    fn test_payload_serde_as_hex() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Payload {
            #[serde(with = "hex_bytes")]
            data: Vec<u8>,
        }

        let payload = Payload { data: vec![0xde, 0xad] };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"data":"0xdead"}"#);
        assert_eq!(serde_json::from_str::<Payload>(&json).unwrap(), payload);
    }
}
