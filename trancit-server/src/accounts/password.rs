//! Salted password hashing.
//!
//! Stored form is `sha256$<rounds>$<salt>$<digest>`, with salt and digest
//! base64 encoded. The digest is SHA-256 over salt and password, iterated
//! `rounds` times.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";
const ROUNDS: u32 = 10_000;

fn digest(salt: &[u8], password: &str, rounds: u32) -> [u8; 32] {
    let mut hash: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .into();

    for _ in 1..rounds {
        hash = Sha256::new()
            .chain_update(hash)
            .chain_update(salt)
            .chain_update(password.as_bytes())
            .finalize()
            .into();
    }
    hash
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4();
    let hash = digest(salt.as_bytes(), password, ROUNDS);
    format!(
        "{SCHEME}${ROUNDS}${}${}",
        STANDARD.encode(salt.as_bytes()),
        STANDARD.encode(hash)
    )
}

/// Check a password against a stored hash.
///
/// Malformed stored hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(rounds), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    if rounds == 0 {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(expected)) else {
        return false;
    };

    constant_time_eq(&digest(&salt, password, rounds), &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_correct_password() {
        let stored = hash_password("correct horse");
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("correct horsE", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn stored_form() {
        let stored = hash_password("pw");
        let parts: Vec<_> = stored.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "sha256");
        assert_eq!(parts[1], "10000");
        assert_eq!(STANDARD.decode(parts[2]).unwrap().len(), 16);
        assert_eq!(STANDARD.decode(parts[3]).unwrap().len(), 32);
    }

    #[test]
    fn malformed_hashes_never_verify() {
        for stored in [
            "",
            "sha256",
            "md5$1$AAAA$AAAA",
            "sha256$x$AAAA$AAAA",
            "sha256$0$AAAA$AAAA",
            "sha256$1$!!!$AAAA",
            "sha256$1$AAAA$AAAA$extra",
        ] {
            assert!(!verify_password("pw", stored), "{stored}");
        }
    }

    #[test]
    fn single_round_is_plain_salted_sha256() {
        let salt = b"0123456789abcdef";
        let expected: [u8; 32] = Sha256::new()
            .chain_update(salt)
            .chain_update(b"pw")
            .finalize()
            .into();
        let stored = format!(
            "sha256$1${}${}",
            STANDARD.encode(salt),
            STANDARD.encode(expected)
        );
        assert!(verify_password("pw", &stored));
    }
}
