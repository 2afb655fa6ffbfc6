use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt. Output format is
/// `base64(salt)$base64(sha256(salt || password))`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let digest = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize();

    format!("{}${}", STANDARD.encode(salt), STANDARD.encode(digest))
}

/// Verify a password against a stored hash. Comparison is constant-time;
/// any malformed stored value verifies as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = STANDARD.decode(salt_b64) else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(digest_b64) else {
        return false;
    };

    let digest = Sha256::new()
        .chain_update(&salt)
        .chain_update(password.as_bytes())
        .finalize();

    constant_time_eq::constant_time_eq(&digest, &expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let stored = hash_password("s3cret");
        assert!(verify_password("s3cret", &stored));
    }

    #[test]
    fn wrong_password_rejected() {
        let stored = hash_password("s3cret");
        assert!(!verify_password("not-the-secret", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn malformed_stored_value_rejected() {
        assert!(!verify_password("anything", "no-dollar-sign"));
        assert!(!verify_password("anything", "!!!$???"));
        assert!(!verify_password("anything", ""));
    }
}
