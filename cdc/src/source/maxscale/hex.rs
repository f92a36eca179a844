const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encodes a byte slice as a lowercase hex string, two digits per byte.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len() * 2);

    for byte in bytes {
        result.push(HEX_DIGITS[(byte >> 4) as usize] as char);
        result.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_hex_empty() {
        assert_eq!(encode_hex(&[]), "");
    }

    #[test]
    fn encode_hex_single_byte() {
        assert_eq!(encode_hex(&[0x41]), "41");
    }

    #[test]
    fn encode_hex_multiple_bytes() {
        assert_eq!(encode_hex(b"Hello"), "48656c6c6f");
    }

    #[test]
    fn encode_hex_pads_small_values() {
        assert_eq!(encode_hex(&[0x00, 0x0f, 0xff]), "000fff");
    }
}
