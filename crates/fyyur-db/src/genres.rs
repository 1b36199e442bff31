//! Genre lists are persisted as a JSON array in a text column.

/// Encode a genre list for storage.
pub fn encode(genres: &[String]) -> String {
    serde_json::to_string(genres).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a stored genre list. Blank or malformed values decode to an empty list.
pub fn decode(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(genres) => genres,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable genre list, treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let genres = vec!["Jazz".to_string(), "R&B".to_string()];
        let encoded = encode(&genres);
        assert_eq!(encoded, r#"["Jazz","R&B"]"#);
        assert_eq!(decode(&encoded), genres);
    }

    #[test]
    fn test_decode_blank_is_empty() {
        assert!(decode("").is_empty());
        assert!(decode("   ").is_empty());
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(decode("{Jazz,Swing}").is_empty());
        assert!(decode("null").is_empty());
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[]), "[]");
    }
}
