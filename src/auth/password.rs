use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Returns `(digest, salt)` for a new password, both base64url encoded.
pub fn hash_password(password: &str) -> (String, String) {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = URL_SAFE_NO_PAD.encode(salt_bytes);
    let digest = digest_with_salt(password, &salt);
    (digest, salt)
}

pub fn verify_password(password: &str, salt: &str, expected_digest: &str) -> bool {
    let digest = digest_with_salt(password, salt);
    constant_time_eq::constant_time_eq(digest.as_bytes(), expected_digest.as_bytes())
}

fn digest_with_salt(password: &str, salt: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(b":")
        .chain_update(password.as_bytes())
        .finalize();
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn correct_password_verifies() {
        let (digest, salt) = hash_password("hunter2");
        assert!(verify_password("hunter2", &salt, &digest));
    }

    #[test]
    fn wrong_password_fails() {
        let (digest, salt) = hash_password("hunter2");
        assert!(!verify_password("hunter3", &salt, &digest));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let (digest_a, salt_a) = hash_password("hunter2");
        let (digest_b, salt_b) = hash_password("hunter2");
        assert_ne!(salt_a, salt_b);
        assert_ne!(digest_a, digest_b);
    }
}
