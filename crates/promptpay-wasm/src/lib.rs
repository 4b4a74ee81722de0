//! WASM bindings for PromptPay QR generation
//!
//! JavaScript API used by the UI layer to build payloads and render them.

use promptpay_core::{
    banks, build_bill_payment_payload, build_promptpay_payload, lookup_bank, BillPayment, EmvData,
    PaymentQr, RenderOptions, RenderedQr,
};
use wasm_bindgen::prelude::*;

/// Panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("PromptPay WASM module initialized");
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

/// `undefined` / `null` fall back to the defaults; partial objects are merged with them
fn parse_options(options: JsValue) -> Result<RenderOptions, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(RenderOptions::default());
    }
    serde_wasm_bindgen::from_value(options).map_err(|e| JsError::new(&e.to_string()))
}

/// PromptPay payload string
///
/// @param target - phone number, national ID or e-wallet ID
/// @param amount - optional amount in baht
#[wasm_bindgen(js_name = generatePromptPayPayload)]
pub fn generate_promptpay_payload(target: &str, amount: Option<f64>) -> Result<String, JsError> {
    build_promptpay_payload(target, amount).map_err(|e| JsError::new(&e.to_string()))
}

/// Bill payment payload string
#[wasm_bindgen(js_name = generateBillPaymentPayload)]
pub fn generate_bill_payment_payload(
    bank_code: &str,
    account_number: &str,
    amount: Option<f64>,
    reference1: Option<String>,
    reference2: Option<String>,
) -> Result<String, JsError> {
    build_bill_payment_payload(
        bank_code,
        account_number,
        amount,
        reference1.as_deref(),
        reference2.as_deref(),
    )
    .map_err(|e| JsError::new(&e.to_string()))
}

/// Verify the checksum and decode a payload
///
/// @returns Object with the decoded fields
#[wasm_bindgen(js_name = decodePayload)]
pub fn decode_payload(payload: &str) -> Result<JsValue, JsError> {
    let data = EmvData::parse(payload).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&data)
}

/// Bank metadata or null
#[wasm_bindgen(js_name = lookupBank)]
pub fn lookup_bank_js(code: &str) -> Result<JsValue, JsError> {
    match lookup_bank(code) {
        Some(entry) => to_js(entry),
        None => Ok(JsValue::NULL),
    }
}

/// All registered banks
#[wasm_bindgen(js_name = listBanks)]
pub fn list_banks() -> Result<JsValue, JsError> {
    to_js(&banks())
}

/// Render a payload
///
/// @param payload - finished payload string
/// @param options - { width, margin, darkColor, lightColor, format: "png" | "svg" }
/// @returns PNG data URL or SVG markup
#[wasm_bindgen(js_name = renderQr)]
pub fn render_qr(payload: &str, options: JsValue) -> Result<String, JsError> {
    let qr = PaymentQr::with_options(parse_options(options)?);
    match qr.render(payload) {
        Ok(RenderedQr::DataUrl(data)) | Ok(RenderedQr::Svg(data)) => Ok(data),
        Err(e) => Err(JsError::new(&e.to_string())),
    }
}

/// JavaScript-accessible generator: payload and image in one call
#[wasm_bindgen]
pub struct WasmPaymentQr {
    inner: PaymentQr,
}

#[wasm_bindgen]
impl WasmPaymentQr {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<WasmPaymentQr, JsError> {
        Ok(Self {
            inner: PaymentQr::with_options(parse_options(options)?),
        })
    }

    /// @returns { payload, image: { type, data } }
    #[wasm_bindgen(js_name = promptPay)]
    pub fn promptpay(&self, target: &str, amount: Option<f64>) -> Result<JsValue, JsError> {
        let generated = self
            .inner
            .promptpay(target, amount)
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&generated)
    }

    /// @param bill - { bankCode, accountNumber, amount?, reference1?, reference2? }
    #[wasm_bindgen(js_name = billPayment)]
    pub fn bill_payment(&self, bill: JsValue) -> Result<JsValue, JsError> {
        let bill: BillPayment =
            serde_wasm_bindgen::from_value(bill).map_err(|e| JsError::new(&e.to_string()))?;
        let generated = self
            .inner
            .bill_payment(&bill)
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&generated)
    }
}

/// Version information
#[wasm_bindgen(js_name = version)]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_promptpay_payload() {
        let payload = generate_promptpay_payload("0812345678", Some(100.0)).unwrap();
        assert!(payload.starts_with("000201010212"));
        assert!(payload.ends_with("F142"));
    }

    #[wasm_bindgen_test]
    fn test_bill_payment_missing_field() {
        assert!(generate_bill_payment_payload("", "123", None, None, None).is_err());
    }

    #[wasm_bindgen_test]
    fn test_render_default_options() {
        let payload = generate_promptpay_payload("0812345678", None).unwrap();
        let url = render_qr(&payload, JsValue::UNDEFINED).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[wasm_bindgen_test]
    fn test_lookup_bank() {
        assert!(lookup_bank_js("014").unwrap().is_object());
        assert!(lookup_bank_js("999").unwrap().is_null());
    }

    #[wasm_bindgen_test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
    }
}
