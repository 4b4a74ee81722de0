//! PromptPay and bill payment payload builders
//!
//! Top-level field order is fixed: 00, 01, 29|30, 53, 54 (optional), 58, 63.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crc::crc16;
use crate::target::Target;
use crate::tlv::{encode_fields, format_tlv, TlvField, MAX_VALUE_LEN};

/// Application identifier for PromptPay credit transfer (tag 29)
pub const PROMPTPAY_AID: &str = "A000000677010111";
/// Application identifier for domestic bill payment (tag 30)
pub const BILL_PAYMENT_AID: &str = "A000000677010112";

pub const PAYLOAD_FORMAT_INDICATOR: &str = "01";
/// Reusable QR without a fixed amount
pub const POI_STATIC: &str = "11";
/// Single-use QR carrying an amount
pub const POI_DYNAMIC: &str = "12";
/// ISO 4217 numeric code for Thai Baht
pub const CURRENCY_THB: &str = "764";
pub const COUNTRY_CODE: &str = "TH";

/// Tag, length and position of the checksum field
pub const CRC_PREFIX: &str = "6304";

/// Reference fields are cut to this many characters
pub const MAX_REFERENCE_LEN: usize = 25;

/// Payload construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Value of tag {tag} is {len} bytes, limit is 99")]
    FieldTooLong { tag: String, len: usize },
    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),
}

/// Amount as it goes into tag 54, rounded half away from zero to whole satang.
///
/// Absent, non-positive, non-finite or below half a satang means static QR.
fn format_amount(amount: Option<f64>) -> Option<String> {
    let value = amount.filter(|v| v.is_finite() && *v > 0.0)?;
    let satang = (value * 100.0).round();
    if satang < 1.0 {
        return None;
    }
    let satang = satang as u64;
    Some(format!("{}.{:02}", satang / 100, satang % 100))
}

/// Assemble top-level fields around a merchant-account sub-tree and seal with CRC
fn assemble(merchant_tag: &str, merchant: String, amount: Option<f64>) -> Result<String, PayloadError> {
    let amount = format_amount(amount);
    let poi = if amount.is_some() { POI_DYNAMIC } else { POI_STATIC };

    let mut fields = vec![
        TlvField::new("00", PAYLOAD_FORMAT_INDICATOR),
        TlvField::new("01", poi),
        TlvField::new(merchant_tag, merchant),
        TlvField::new("53", CURRENCY_THB),
    ];
    if let Some(amount) = amount {
        fields.push(TlvField::new("54", amount));
    }
    fields.push(TlvField::new("58", COUNTRY_CODE));

    let mut payload = encode_fields(&fields)?;
    payload.push_str(CRC_PREFIX);
    let checksum = crc16(&payload);
    payload.push_str(&checksum);
    Ok(payload)
}

/// Build a PromptPay credit transfer payload (merchant account tag 29).
///
/// `target` may be a phone number, national ID or e-wallet ID in any
/// formatting; see [`Target::classify`].
pub fn build_promptpay_payload(target: &str, amount: Option<f64>) -> Result<String, PayloadError> {
    let target = Target::classify(target);
    build_promptpay_for(&target, amount)
}

/// Same as [`build_promptpay_payload`] for an already classified target
pub fn build_promptpay_for(target: &Target, amount: Option<f64>) -> Result<String, PayloadError> {
    log::debug!(
        "Building PromptPay payload, target type {}, amount {:?}",
        target.type_code(),
        amount
    );

    let merchant = encode_fields(&[
        TlvField::new("00", PROMPTPAY_AID),
        TlvField::new(target.type_code(), target.canonical_id()),
    ])?;

    assemble("29", merchant, amount)
}

/// Bill payment request (merchant account tag 30)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPayment {
    pub bank_code: String,
    pub account_number: String,
    pub amount: Option<f64>,
    pub reference1: Option<String>,
    pub reference2: Option<String>,
}

impl BillPayment {
    pub fn new(bank_code: impl Into<String>, account_number: impl Into<String>) -> Self {
        Self {
            bank_code: bank_code.into(),
            account_number: account_number.into(),
            ..Default::default()
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn reference1(mut self, reference: impl Into<String>) -> Self {
        self.reference1 = Some(reference.into());
        self
    }

    pub fn reference2(mut self, reference: impl Into<String>) -> Self {
        self.reference2 = Some(reference.into());
        self
    }

    /// 3-digit bank code followed by a 17-character account part.
    ///
    /// The account is left-padded with zeros to 17 and then cut to its first
    /// 17 characters, so longer account numbers lose their tail.
    pub fn biller_id(&self) -> Result<String, PayloadError> {
        if self.bank_code.is_empty() {
            return Err(PayloadError::MissingField("bank_code"));
        }
        if self.account_number.is_empty() {
            return Err(PayloadError::MissingField("account_number"));
        }

        let bank: String = self.bank_code.chars().filter(|c| c.is_ascii_digit()).collect();
        let account: String = self
            .account_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();

        if account.len() > 17 {
            log::warn!(
                "Account number has {} digits, keeping the first 17",
                account.len()
            );
        }
        let account: String = format!("{:0>17}", account).chars().take(17).collect();

        Ok(format!("{:0>3}{}", bank, account))
    }

    pub fn build(&self) -> Result<String, PayloadError> {
        let biller_id = self.biller_id()?;
        log::debug!(
            "Building bill payment payload, biller {}, amount {:?}",
            biller_id,
            self.amount
        );

        let mut fields = vec![
            TlvField::new("00", BILL_PAYMENT_AID),
            TlvField::new("01", biller_id),
        ];
        if let Some(reference) = non_empty(&self.reference1) {
            fields.push(TlvField::new("02", truncate_reference(reference)));
        }
        let mut merchant = encode_fields(&fields)?;
        if let Some(reference) = non_empty(&self.reference2) {
            // Both references at full length overflow the 99-byte container
            let budget = MAX_VALUE_LEN.saturating_sub(merchant.len() + 4);
            let reference = fit_reference(&truncate_reference(reference), budget);
            if reference.is_empty() {
                log::warn!("No room left for reference2, dropping it");
            } else {
                merchant.push_str(&format_tlv("03", &reference)?);
            }
        }

        assemble("30", merchant, self.amount)
    }
}

/// Build a bill payment payload.
///
/// Fails with [`PayloadError::MissingField`] before any encoding when the
/// bank code or account number is empty.
pub fn build_bill_payment_payload(
    bank_code: &str,
    account_number: &str,
    amount: Option<f64>,
    reference1: Option<&str>,
    reference2: Option<&str>,
) -> Result<String, PayloadError> {
    BillPayment {
        bank_code: bank_code.to_string(),
        account_number: account_number.to_string(),
        amount,
        reference1: reference1.map(str::to_string),
        reference2: reference2.map(str::to_string),
    }
    .build()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn truncate_reference(reference: &str) -> String {
    if reference.chars().count() > MAX_REFERENCE_LEN {
        log::warn!(
            "Reference truncated to {} characters: {:?}",
            MAX_REFERENCE_LEN,
            reference
        );
    }
    reference.chars().take(MAX_REFERENCE_LEN).collect()
}

/// Longest prefix of `reference` that fits in `budget` bytes
fn fit_reference(reference: &str, budget: usize) -> String {
    if reference.len() <= budget {
        return reference.to_string();
    }
    log::warn!(
        "reference2 shortened to {} bytes to fit merchant account information",
        budget
    );
    let mut end = budget;
    while !reference.is_char_boundary(end) {
        end -= 1;
    }
    reference[..end].to_string()
}
