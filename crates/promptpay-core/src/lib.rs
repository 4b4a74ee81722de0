//! PromptPay Core - EMVCo QR payload codec for Thailand
//!
//! Builds the text payload of a PromptPay or bill payment QR code:
//! - Classification of phone numbers, national IDs and e-wallet IDs
//! - Nested TLV encoding of the merchant account information (tags 29/30)
//! - CRC-16/CCITT-FALSE checksum (tag 63)
//! - Decoding and verification of finished payloads
//! - Rendering to PNG data URLs or SVG through a pluggable renderer

pub mod crc;
pub mod tlv;
pub mod target;
pub mod bank;
pub mod payload;
pub mod emv;
pub mod render;

pub use crc::crc16;
pub use tlv::{format_tlv, TlvField, TlvReader};
pub use target::Target;
pub use bank::{banks, lookup_bank, BankEntry};
pub use payload::{
    build_bill_payment_payload, build_promptpay_payload, BillPayment, PayloadError,
};
pub use emv::{verify, EmvData, EmvError, MerchantAccount};
pub use render::{ImageFormat, QrCodeRenderer, QrRenderer, RenderError, RenderOptions, RenderedQr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main errors of the crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptPayError {
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Decode error: {0}")]
    Decode(#[from] EmvError),
}

/// Payload together with its rendered image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQr {
    pub payload: String,
    pub image: RenderedQr,
}

/// Payload builder and renderer in one place
pub struct PaymentQr<R = QrCodeRenderer> {
    renderer: R,
    options: RenderOptions,
}

impl Default for PaymentQr {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentQr {
    /// Default renderer with default options
    pub fn new() -> Self {
        Self::with_renderer(QrCodeRenderer::new())
    }

    /// Default renderer with custom options
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            renderer: QrCodeRenderer::new(),
            options,
        }
    }
}

impl<R: QrRenderer> PaymentQr<R> {
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            renderer,
            options: RenderOptions::default(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// PromptPay transfer QR for a phone number, national ID or e-wallet ID
    pub fn promptpay(&self, target: &str, amount: Option<f64>) -> Result<GeneratedQr, PromptPayError> {
        let payload = build_promptpay_payload(target, amount)?;
        self.finish(payload)
    }

    /// Bill payment QR
    pub fn bill_payment(&self, bill: &BillPayment) -> Result<GeneratedQr, PromptPayError> {
        let payload = bill.build()?;
        self.finish(payload)
    }

    /// Render an already built payload
    pub fn render(&self, payload: &str) -> Result<RenderedQr, PromptPayError> {
        self.renderer.render(payload, &self.options).map_err(|e| {
            log::error!("QR rendering failed: {}", e);
            PromptPayError::from(e)
        })
    }

    fn finish(&self, payload: String) -> Result<GeneratedQr, PromptPayError> {
        let image = self.render(&payload)?;
        log::info!("Generated QR for {} byte payload", payload.len());
        Ok(GeneratedQr { payload, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRenderer;

    impl QrRenderer for FailingRenderer {
        fn render(&self, _payload: &str, _options: &RenderOptions) -> Result<RenderedQr, RenderError> {
            Err(RenderError::Image("canvas unavailable".to_string()))
        }
    }

    struct EchoRenderer;

    impl QrRenderer for EchoRenderer {
        fn render(&self, payload: &str, options: &RenderOptions) -> Result<RenderedQr, RenderError> {
            Ok(RenderedQr::Svg(format!("{}@{}", payload, options.width)))
        }
    }

    #[test]
    fn test_render_failure_propagated_unchanged() {
        let qr = PaymentQr::with_renderer(FailingRenderer);
        assert_eq!(
            qr.promptpay("0812345678", None),
            Err(PromptPayError::Render(RenderError::Image(
                "canvas unavailable".to_string()
            )))
        );
    }

    #[test]
    fn test_payload_error_before_render() {
        let qr = PaymentQr::with_renderer(FailingRenderer);
        assert_eq!(
            qr.bill_payment(&BillPayment::new("", "123")),
            Err(PromptPayError::Payload(PayloadError::MissingField("bank_code")))
        );
    }

    #[test]
    fn test_options_passed_to_renderer() {
        let mut qr = PaymentQr::with_renderer(EchoRenderer);
        qr.set_options(RenderOptions {
            width: 512,
            ..RenderOptions::default()
        });

        let generated = qr.promptpay("0812345678", Some(100.0)).unwrap();
        assert_eq!(
            generated.image,
            RenderedQr::Svg(format!("{}@512", generated.payload))
        );
    }
}
