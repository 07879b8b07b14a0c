//! Gravatar images for comment and reply authors.

use sha2::{Digest, Sha256};

const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar";

/// Avatar edge length in pixels.
pub const AVATAR_SIZE: u16 = 50;

/// Gravatar URL for an email address.
///
/// The address is trimmed and lowercased before hashing. Accounts without a
/// Gravatar get a generated "retro" image; only G-rated images are shown.
#[must_use]
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "{GRAVATAR_BASE}/{}?s={AVATAR_SIZE}&r=g&d=retro",
        hex::encode(digest)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_url() {
        assert_eq!(
            gravatar_url("ada@example.com"),
            "https://www.gravatar.com/avatar/\
             b5fc85e55755f9e0d030a10ab4429b6b2944855f9a0d60077fe832becbc41d72\
             ?s=50&r=g&d=retro"
        );
    }

    #[test]
    fn test_gravatar_url_normalises_email() {
        assert_eq!(
            gravatar_url(" Ada@Example.com "),
            gravatar_url("ada@example.com")
        );
    }
}
