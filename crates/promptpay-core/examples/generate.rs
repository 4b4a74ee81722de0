//! Generate PromptPay QR images from the command line
//!
//! Usage: cargo run -p promptpay-core --example generate -- <target> [amount]
//!        cargo run -p promptpay-core --example generate -- bill <bank> <account> [amount] [ref1] [ref2]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use promptpay_core::{lookup_bank, BillPayment, EmvData, PaymentQr, RenderOptions, RenderedQr};
use std::fs;
use std::path::Path;

fn parse_amount(arg: Option<&String>) -> anyhow::Result<Option<f64>> {
    Ok(match arg {
        Some(v) => Some(v.parse()?),
        None => None,
    })
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output_dir = Path::new("generated_qr");
    fs::create_dir_all(output_dir)?;

    let png = PaymentQr::new();
    let svg = PaymentQr::with_options(RenderOptions::svg());

    let generated = match args.first().map(String::as_str) {
        Some("bill") => {
            let (bank, account) = match (args.get(1), args.get(2)) {
                (Some(bank), Some(account)) => (bank, account),
                _ => anyhow::bail!("usage: generate bill <bank> <account> [amount] [ref1] [ref2]"),
            };
            if let Some(entry) = lookup_bank(bank) {
                println!("Bank: {} ({})", entry.name, entry.short_name);
            }
            let mut bill = BillPayment::new(bank.as_str(), account.as_str());
            bill.amount = parse_amount(args.get(3))?;
            bill.reference1 = args.get(4).cloned();
            bill.reference2 = args.get(5).cloned();
            png.bill_payment(&bill)?
        }
        Some(target) => png.promptpay(target, parse_amount(args.get(1))?)?,
        None => anyhow::bail!("usage: generate <target> [amount]"),
    };

    println!("Payload: {}", generated.payload);
    println!("{:#?}", EmvData::parse(&generated.payload)?);

    if let RenderedQr::DataUrl(url) = &generated.image {
        let b64 = url.trim_start_matches("data:image/png;base64,");
        fs::write(output_dir.join("promptpay.png"), STANDARD.decode(b64)?)?;
    }
    if let RenderedQr::Svg(markup) = svg.render(&generated.payload)? {
        fs::write(output_dir.join("promptpay.svg"), markup)?;
    }

    println!("Images saved to {:?}", output_dir);
    Ok(())
}
