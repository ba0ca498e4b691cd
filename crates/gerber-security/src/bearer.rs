//! `Authorization` header parsing

use gerber_shared::constants::BEARER_PREFIX;

/// Token part of a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
