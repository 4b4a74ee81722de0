use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::crc::crc16;
use crate::payload::{BILL_PAYMENT_AID, CRC_PREFIX, PROMPTPAY_AID};
use crate::target::Target;
use crate::tlv::TlvReader;

/// EMV Parsing Errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmvError {
    #[error("Invalid CRC: expected {expected}, got {actual}")]
    InvalidCrc { expected: String, actual: String },
    #[error("Missing Checksum (Tag 63)")]
    MissingChecksum,
    #[error("Malformed TLV data")]
    MalformedData,
    #[error("Unexpected tag {0} in merchant account information")]
    UnexpectedTag(String),
    #[error("No PromptPay (29) or bill payment (30) merchant account")]
    UnsupportedMerchant,
}

/// Decoded merchant account information (tag 29 or 30)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MerchantAccount {
    #[serde(rename_all = "camelCase")]
    PromptPay { aid: String, target: Target },
    #[serde(rename_all = "camelCase")]
    BillPayment {
        aid: String,
        biller_id: String,
        reference1: Option<String>,
        reference2: Option<String>,
    },
}

/// Parsed PromptPay / bill payment payload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmvData {
    pub raw_data: String,
    pub pfi: String, // Payload Format Indicator (00)
    pub point_of_initiation: Option<String>, // (01)
    pub merchant: MerchantAccount, // (29 | 30)
    pub transaction_currency: Option<String>, // (53)
    pub transaction_amount: Option<String>, // (54)
    pub country_code: Option<String>, // (58)
    pub crc: String, // (63)
    pub unparsed_tags: HashMap<String, String>,
}

impl EmvData {
    pub fn parse(raw: &str) -> Result<Self, EmvError> {
        // 1. Validate CRC first
        verify(raw)?;

        // 2. Parse TLV
        let mut tags = HashMap::new();
        for field in TlvReader::new(raw) {
            let (tag, value) = field?;
            tags.insert(tag.to_string(), value.to_string());
        }

        // 3. Map to Struct
        let pfi = tags.remove("00").ok_or(EmvError::MalformedData)?;
        let crc = tags.remove("63").ok_or(EmvError::MissingChecksum)?;

        let merchant = match (tags.remove("29"), tags.remove("30")) {
            (Some(value), None) => parse_promptpay(&value)?,
            (None, Some(value)) => parse_bill_payment(&value)?,
            _ => return Err(EmvError::UnsupportedMerchant),
        };

        Ok(EmvData {
            raw_data: raw.to_string(),
            pfi,
            point_of_initiation: tags.remove("01"),
            merchant,
            transaction_currency: tags.remove("53"),
            transaction_amount: tags.remove("54"),
            country_code: tags.remove("58"),
            crc,
            unparsed_tags: tags,
        })
    }

    /// Amount in baht, if the payload carries one
    pub fn amount(&self) -> Option<f64> {
        self.transaction_amount.as_deref().and_then(|v| v.parse().ok())
    }

    /// Point of initiation "12": single-use QR with a fixed amount
    pub fn is_dynamic(&self) -> bool {
        self.point_of_initiation.as_deref() == Some("12")
    }
}

fn parse_promptpay(value: &str) -> Result<MerchantAccount, EmvError> {
    let mut aid = None;
    let mut target = None;

    for field in TlvReader::new(value) {
        let (tag, value) = field?;
        match tag {
            "00" => aid = Some(value.to_string()),
            _ => match Target::from_type_code(tag, value) {
                Some(t) if target.is_none() => target = Some(t),
                _ => return Err(EmvError::UnexpectedTag(tag.to_string())),
            },
        }
    }

    let aid = aid.ok_or(EmvError::MalformedData)?;
    if aid != PROMPTPAY_AID {
        log::debug!("Unexpected PromptPay AID {}", aid);
    }
    Ok(MerchantAccount::PromptPay {
        aid,
        target: target.ok_or(EmvError::MalformedData)?,
    })
}

fn parse_bill_payment(value: &str) -> Result<MerchantAccount, EmvError> {
    let mut fields = HashMap::new();
    for field in TlvReader::new(value) {
        let (tag, value) = field?;
        match tag {
            "00" | "01" | "02" | "03" => {
                fields.insert(tag, value.to_string());
            }
            _ => return Err(EmvError::UnexpectedTag(tag.to_string())),
        }
    }

    let aid = fields.remove("00").ok_or(EmvError::MalformedData)?;
    if aid != BILL_PAYMENT_AID {
        log::debug!("Unexpected bill payment AID {}", aid);
    }
    Ok(MerchantAccount::BillPayment {
        aid,
        biller_id: fields.remove("01").ok_or(EmvError::MalformedData)?,
        reference1: fields.remove("02"),
        reference2: fields.remove("03"),
    })
}

/// Check that `raw` ends with a tag 63 whose value is the CRC of everything before it
pub fn verify(raw: &str) -> Result<(), EmvError> {
    let len = raw.len();
    if len < 8 {
        return Err(EmvError::MalformedData);
    }

    // Format: ... + '63' + '04' + 'CRC'
    let checksum_tag = raw.get(len - 8..len - 4).ok_or(EmvError::MalformedData)?;
    if checksum_tag != CRC_PREFIX {
        return Err(EmvError::MissingChecksum);
    }

    let provided_crc = raw.get(len - 4..).ok_or(EmvError::MalformedData)?;
    let calculated_crc = crc16(&raw[..len - 4]);

    if provided_crc.to_uppercase() != calculated_crc {
        return Err(EmvError::InvalidCrc {
            expected: calculated_crc,
            actual: provided_crc.to_string(),
        });
    }

    Ok(())
}
