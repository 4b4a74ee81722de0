//! EMV Tag-Length-Value primitives
//!
//! Every field is `TAG(2) LEN(2) VALUE(LEN bytes)` with no delimiters.
//! The length is two decimal digits, so a value can carry at most 99 bytes.

use serde::{Deserialize, Serialize};

use crate::emv::EmvError;
use crate::payload::PayloadError;

/// Largest value a two-digit length prefix can describe
pub const MAX_VALUE_LEN: usize = 99;

/// Single TLV field. Container tags (29, 30) hold already encoded sub-fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlvField {
    pub tag: String,
    pub value: String,
}

impl TlvField {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }

    pub fn encode(&self) -> Result<String, PayloadError> {
        format_tlv(&self.tag, &self.value)
    }
}

/// Encode `tag + LEN + value`.
///
/// Fails instead of writing a malformed prefix when the value does not fit
/// in 99 bytes; callers truncate free-text fields before getting here.
pub fn format_tlv(tag: &str, value: &str) -> Result<String, PayloadError> {
    if tag.len() != 2 || !tag.is_ascii() {
        return Err(PayloadError::InvalidTag(tag.to_string()));
    }
    if value.len() > MAX_VALUE_LEN {
        return Err(PayloadError::FieldTooLong {
            tag: tag.to_string(),
            len: value.len(),
        });
    }
    Ok(format!("{}{:02}{}", tag, value.len(), value))
}

/// Concatenate fields in order
pub fn encode_fields(fields: &[TlvField]) -> Result<String, PayloadError> {
    let mut out = String::new();
    for field in fields {
        out.push_str(&field.encode()?);
    }
    Ok(out)
}

/// Sequential reader over an encoded TLV string
pub struct TlvReader<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> TlvReader<'a> {
    pub fn new(data: &'a str) -> Self {
        Self { data, pos: 0 }
    }

    fn read_field(&mut self) -> Result<(&'a str, &'a str), EmvError> {
        let header = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or(EmvError::MalformedData)?;
        let (tag, len_str) = header.split_at(2);

        if !len_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EmvError::MalformedData);
        }
        let value_len = len_str.parse::<usize>().map_err(|_| EmvError::MalformedData)?;

        let start = self.pos + 4;
        let value = self
            .data
            .get(start..start + value_len)
            .ok_or(EmvError::MalformedData)?;

        self.pos = start + value_len;
        Ok((tag, value))
    }
}

impl<'a> Iterator for TlvReader<'a> {
    type Item = Result<(&'a str, &'a str), EmvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let item = self.read_field();
        if item.is_err() {
            // Stop after the first malformed field
            self.pos = self.data.len();
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tlv() {
        assert_eq!(format_tlv("00", "01").unwrap(), "000201");
        assert_eq!(format_tlv("58", "TH").unwrap(), "5802TH");
        assert_eq!(format_tlv("62", "").unwrap(), "6200");
        assert_eq!(
            format_tlv("00", "A000000677010111").unwrap(),
            "0016A000000677010111"
        );
    }

    #[test]
    fn test_length_limit() {
        let max = "9".repeat(99);
        assert_eq!(format_tlv("03", &max).unwrap().len(), 103);

        let over = "9".repeat(100);
        assert_eq!(
            format_tlv("03", &over),
            Err(PayloadError::FieldTooLong {
                tag: "03".to_string(),
                len: 100
            })
        );
    }

    #[test]
    fn test_invalid_tag() {
        assert!(matches!(format_tlv("5", "x"), Err(PayloadError::InvalidTag(_))));
        assert!(matches!(format_tlv("540", "x"), Err(PayloadError::InvalidTag(_))));
    }

    #[test]
    fn test_nested_length_counts_encoded_bytes() {
        let inner = encode_fields(&[
            TlvField::new("00", "A000000677010111"),
            TlvField::new("01", "0066812345678"),
        ])
        .unwrap();
        assert_eq!(inner.len(), 37);
        assert!(format_tlv("29", &inner).unwrap().starts_with("2937"));
    }

    #[test]
    fn test_reader() {
        let fields: Vec<_> = TlvReader::new("0002015802TH5303764")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(fields, vec![("00", "01"), ("58", "TH"), ("53", "764")]);
    }

    #[test]
    fn test_reader_truncated() {
        let mut reader = TlvReader::new("000201580");
        assert_eq!(reader.next(), Some(Ok(("00", "01"))));
        assert_eq!(reader.next(), Some(Err(EmvError::MalformedData)));
        assert_eq!(reader.next(), None);

        let mut reader = TlvReader::new("5805TH");
        assert_eq!(reader.next(), Some(Err(EmvError::MalformedData)));
    }

    #[test]
    fn test_reader_rejects_signed_length() {
        let mut reader = TlvReader::new("00+1X");
        assert_eq!(reader.next(), Some(Err(EmvError::MalformedData)));
    }
}
