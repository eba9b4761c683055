//! Short unique identifiers for query history rows

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use uuid::Uuid;

/// Generate a short, URL-safe unique identifier
///
/// Encodes the 16 random bytes of a v4 UUID as unpadded URL-safe base64,
/// yielding 22 characters.
pub fn generate_short_uid() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}
