//! Byte-level text encoding for stored files
//!
//! Files written by the desktop application are UTF-16 with a big-endian
//! byte-order mark. Newer files default to plain UTF-8. Decoding sniffs
//! the UTF-16 marks and handles both byte orders; anything else is UTF-8
//! taken verbatim, so a leading U+FEFF in a title is kept.

use super::TextEncoding;

const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Encode `text` for writing
pub fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
        TextEncoding::Utf16 => {
            let mut bytes = Vec::with_capacity(2 + text.len() * 2);
            bytes.extend_from_slice(&UTF16_BE_BOM);
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            bytes
        }
    }
}

/// Decode file contents, detecting the encoding from its byte-order mark
pub fn decode(bytes: &[u8]) -> Result<String, String> {
    if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&UTF16_LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    String::from_utf8(bytes.to_vec()).map_err(|e| format!("invalid UTF-8: {}", e))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("truncated UTF-16 data".to_string());
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| format!("invalid UTF-16: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_has_big_endian_mark() {
        let bytes = encode("A", TextEncoding::Utf16);
        assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0x41]);
        assert_eq!(decode(&bytes).unwrap(), "A");
    }

    #[test]
    fn test_little_endian_is_accepted() {
        let bytes = [0xFF, 0xFE, 0x41, 0x00, 0xE9, 0x00];
        assert_eq!(decode(&bytes).unwrap(), "Aé");
    }

    #[test]
    fn test_utf8_is_verbatim() {
        assert_eq!(decode("héllo".as_bytes()).unwrap(), "héllo");
        assert_eq!(decode("\u{FEFF}x".as_bytes()).unwrap(), "\u{FEFF}x");
    }

    #[test]
    fn test_supplementary_characters_survive_utf16() {
        let text = "note \u{1F4A1}";
        assert_eq!(decode(&encode(text, TextEncoding::Utf16)).unwrap(), text);
    }

    #[test]
    fn test_bad_bytes_are_reported() {
        assert!(decode(&[0xFE, 0xFF, 0x00]).is_err());
        assert!(decode(&[0xC3]).is_err());
        assert!(decode(&[0xFE, 0xFF, 0xD8, 0x00]).is_err());
    }
}
