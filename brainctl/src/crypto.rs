use base64::{Engine as _, engine::general_purpose};
use rand::RngExt;

/// Generates a cryptographically secure API key with 256 bits of entropy.
///
/// The key is formatted as `sk-{base64url_encoded_random_bytes}` where the
/// random bytes are 32 bytes (256 bits) of cryptographically secure random data.
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; 32];
    rand::rng().fill(&mut key_bytes);

    format!("sk-{}", general_purpose::URL_SAFE_NO_PAD.encode(key_bytes))
}
