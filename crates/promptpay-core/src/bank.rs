//! Thai bank registry
//!
//! Display metadata keyed by Bank of Thailand 3-digit bank code. Only used
//! to label bill payment QR codes; never consulted when encoding a payload.

use serde::Serialize;

/// Static bank metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    /// Brand color as `#RRGGBB`
    pub color: &'static str,
}

const fn bank(
    code: &'static str,
    name: &'static str,
    short_name: &'static str,
    color: &'static str,
) -> BankEntry {
    BankEntry {
        code,
        name,
        short_name,
        color,
    }
}

// Sorted by code; lookups rely on it.
static BANKS: [BankEntry; 18] = [
    bank("002", "Bangkok Bank", "BBL", "#1E4598"),
    bank("004", "Kasikornbank", "KBANK", "#138F2D"),
    bank("006", "Krungthai Bank", "KTB", "#1BA5E1"),
    bank("011", "TMBThanachart Bank", "TTB", "#0050F0"),
    bank("014", "Siam Commercial Bank", "SCB", "#4E2E7F"),
    bank("017", "Citibank", "CITI", "#1583C7"),
    bank("022", "CIMB Thai Bank", "CIMBT", "#7E2F36"),
    bank("024", "United Overseas Bank (Thai)", "UOBT", "#0B3979"),
    bank("025", "Bank of Ayudhya", "BAY", "#FEC43B"),
    bank("030", "Government Savings Bank", "GSB", "#EB198D"),
    bank("033", "Government Housing Bank", "GHB", "#F57D23"),
    bank("034", "Bank for Agriculture and Agricultural Cooperatives", "BAAC", "#4B9B1D"),
    bank("066", "Islamic Bank of Thailand", "ISBT", "#184615"),
    bank("067", "TISCO Bank", "TISCO", "#12549F"),
    bank("069", "Kiatnakin Phatra Bank", "KKP", "#199CC5"),
    bank("070", "ICBC (Thai)", "ICBCT", "#C50F1C"),
    bank("071", "Thai Credit Bank", "TCD", "#0A4AB2"),
    bank("073", "Land and Houses Bank", "LHFG", "#6D6E71"),
];

/// Every registered bank in code order
pub fn banks() -> &'static [BankEntry] {
    &BANKS
}

/// Find a bank by code. `"14"` and `"014"` both resolve to SCB.
pub fn lookup_bank(code: &str) -> Option<&'static BankEntry> {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() > 3 {
        return None;
    }
    let normalized = format!("{:0>3}", digits);

    BANKS
        .binary_search_by(|entry| entry.code.cmp(normalized.as_str()))
        .ok()
        .map(|idx| &BANKS[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let scb = lookup_bank("014").unwrap();
        assert_eq!(scb.short_name, "SCB");
        assert_eq!(scb.name, "Siam Commercial Bank");

        assert_eq!(lookup_bank("14"), Some(scb));
        assert_eq!(lookup_bank("004").unwrap().short_name, "KBANK");
    }

    #[test]
    fn test_lookup_missing() {
        assert!(lookup_bank("999").is_none());
        assert!(lookup_bank("").is_none());
        assert!(lookup_bank("0014").is_none());
    }

    #[test]
    fn test_table_sorted_and_unique() {
        for pair in banks().windows(2) {
            assert!(pair[0].code < pair[1].code, "{} >= {}", pair[0].code, pair[1].code);
        }
    }

    #[test]
    fn test_table_format() {
        for entry in banks() {
            assert_eq!(entry.code.len(), 3);
            assert!(entry.code.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(entry.color.len(), 7);
            assert!(entry.color.starts_with('#'));
            assert!(entry.color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(lookup_bank("002").unwrap()).unwrap();
        assert_eq!(json["shortName"], "BBL");
        assert_eq!(json["color"], "#1E4598");
    }
}
