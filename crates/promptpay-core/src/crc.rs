//! CRC-16/CCITT-FALSE checksum used by the EMV QR payload (tag 63)
//!
//! Poly: 0x1021
//! Init: 0xFFFF
//! No reflection, no final XOR.

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

/// Raw 16-bit checksum over a byte slice
pub fn checksum(data: &[u8]) -> u16 {
    let mut crc = INIT;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Checksum of the UTF-8 bytes of `payload` as 4 uppercase hex digits
pub fn crc16(payload: &str) -> String {
    format!("{:04X}", checksum(payload.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors() {
        assert_eq!(crc16(""), "FFFF");
        assert_eq!(crc16("123456789"), "29B1");
        assert_eq!(checksum(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_zero_padded_uppercase() {
        let hex = crc16(
            "00020101021230600016A0000006770101120120004123456789012345670204REF10304REF25303764540510.005802TH6304",
        );
        assert_eq!(hex, "06A3");
        assert_eq!(hex.len(), 4);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_deterministic() {
        let input = "0002010102125802TH6304";
        assert_eq!(crc16(input), crc16(input));
    }
}
