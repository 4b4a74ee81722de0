//! PromptPay target classification
//!
//! A free-form payee identifier is reduced to its digits and dispatched to
//! one of three proxy types. Anything that is not a recognizable phone
//! number or national ID falls through to [`Target::Other`], so
//! classification never fails.

use serde::{Deserialize, Serialize};

/// Sub-tag of a domestic or international mobile number
pub const TYPE_MOBILE: &str = "01";
/// Sub-tag of a 13-digit national ID / tax ID
pub const TYPE_NATIONAL_ID: &str = "02";
/// Sub-tag of an e-wallet or any other identifier
pub const TYPE_OTHER: &str = "03";

/// Classified PromptPay proxy with its canonical identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Target {
    /// Mobile number as `0066` + 9 national digits (13 digits)
    Mobile(String),
    /// National identity number, unchanged
    NationalId(String),
    /// E-wallet or unrecognized identifier, digits only (may be empty)
    Other(String),
}

impl Target {
    /// Classify a raw identifier. First matching rule wins.
    pub fn classify(raw: &str) -> Self {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        let target = match digits.len() {
            10 if digits.starts_with('0') => Target::Mobile(format!("0066{}", &digits[1..])),
            11 if digits.starts_with("66") => Target::Mobile(format!("00{}", digits)),
            13 => Target::NationalId(digits),
            _ => Target::Other(digits),
        };

        log::debug!("Classified target as type {}", target.type_code());
        target
    }

    /// Rebuild a target from a decoded merchant-account sub-field
    pub fn from_type_code(type_code: &str, id: &str) -> Option<Self> {
        match type_code {
            TYPE_MOBILE => Some(Target::Mobile(id.to_string())),
            TYPE_NATIONAL_ID => Some(Target::NationalId(id.to_string())),
            TYPE_OTHER => Some(Target::Other(id.to_string())),
            _ => None,
        }
    }

    /// Sub-tag used inside merchant account information (tag 29)
    pub fn type_code(&self) -> &'static str {
        match self {
            Target::Mobile(_) => TYPE_MOBILE,
            Target::NationalId(_) => TYPE_NATIONAL_ID,
            Target::Other(_) => TYPE_OTHER,
        }
    }

    pub fn canonical_id(&self) -> &str {
        match self {
            Target::Mobile(id) | Target::NationalId(id) | Target::Other(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domestic_mobile() {
        let target = Target::classify("0812345678");
        assert_eq!(target, Target::Mobile("0066812345678".to_string()));
        assert_eq!(target.type_code(), "01");
    }

    #[test]
    fn test_formatted_mobile() {
        assert_eq!(
            Target::classify("081-234-5678"),
            Target::Mobile("0066812345678".to_string())
        );
        assert_eq!(
            Target::classify("+66 81 234 5678"),
            Target::Mobile("0066812345678".to_string())
        );
    }

    #[test]
    fn test_international_mobile_matches_domestic() {
        assert_eq!(Target::classify("66812345678"), Target::classify("0812345678"));
    }

    #[test]
    fn test_national_id() {
        let target = Target::classify("1234567890123");
        assert_eq!(target, Target::NationalId("1234567890123".to_string()));
        assert_eq!(target.type_code(), "02");

        assert_eq!(
            Target::classify("1-2345-67890-12-3").canonical_id(),
            "1234567890123"
        );
    }

    #[test]
    fn test_fallback_other() {
        // 10 digits without a leading zero is not a phone number
        assert_eq!(Target::classify("1812345678").type_code(), "03");
        // 11 digits without the country code
        assert_eq!(Target::classify("07812345678").type_code(), "03");
        assert_eq!(
            Target::classify("123456789012345"),
            Target::Other("123456789012345".to_string())
        );
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(Target::classify(""), Target::Other(String::new()));
        assert_eq!(Target::classify("wallet-abc"), Target::Other(String::new()));
    }

    #[test]
    fn test_from_type_code() {
        let target = Target::classify("0812345678");
        assert_eq!(
            Target::from_type_code(target.type_code(), target.canonical_id()),
            Some(target)
        );
        assert_eq!(Target::from_type_code("04", "123"), None);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Target::classify("0812345678")).unwrap();
        assert_eq!(json["kind"], "mobile");
        assert_eq!(json["id"], "0066812345678");
    }
}
