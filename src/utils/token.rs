//! Random session token generation.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Random bytes in a session token before base64 encoding.
const SESSION_TOKEN_BYTES: usize = 32;

fn random_bytes<const N: usize>() -> Result<[u8; N], AppError> {
    let mut buffer = [0u8; N];
    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Random number generator failed",
            json!({ "reason": e.to_string() }),
        )
    })?;
    Ok(buffer)
}

/// Generates an opaque, URL-safe session token (43 characters, no padding).
pub fn generate_session_token() -> Result<String, AppError> {
    let bytes = random_bytes::<SESSION_TOKEN_BYTES>()?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_token_shape() {
        let token = generate_session_token().unwrap();
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let tokens: HashSet<String> = (0..500)
            .map(|_| generate_session_token().unwrap())
            .collect();
        assert_eq!(tokens.len(), 500);
    }
}
