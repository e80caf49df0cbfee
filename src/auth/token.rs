use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::guard::Identity;
use crate::error::AppError;
use crate::models::user::Role;

const HMAC_BLOCK_SIZE: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    exp: i64,
}

/// Issues and verifies signed identity tokens.
///
/// A token is `base64url(claims json) . base64url(hmac_sha256(secret, claims))`.
/// Verification is a pure function of the secret and the token; there is no
/// refresh path, callers re-login on expiry.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, subject: Uuid, role: Role) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject,
            role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|err| AppError::Internal(format!("failed to encode claims: {err}")))?;
        let encoded = URL_SAFE_NO_PAD.encode(&payload);
        let signature = URL_SAFE_NO_PAD.encode(hmac_sha256(&self.secret, encoded.as_bytes()));

        Ok(format!("{encoded}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let (encoded, signature) = token
            .split_once('.')
            .ok_or_else(|| AppError::Unauthenticated("invalid token".to_string()))?;

        let presented = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::Unauthenticated("invalid token".to_string()))?;
        let expected = hmac_sha256(&self.secret, encoded.as_bytes());

        if !constant_time_eq::constant_time_eq(&presented, &expected) {
            return Err(AppError::Unauthenticated("invalid token".to_string()));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| AppError::Unauthenticated("invalid token".to_string()))?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|_| AppError::Unauthenticated("invalid token".to_string()))?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(AppError::Unauthenticated("token expired".to_string()));
        }

        Ok(Identity {
            id: claims.sub,
            role: claims.role,
        })
    }
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut block = [0u8; HMAC_BLOCK_SIZE];
    if key.len() > HMAC_BLOCK_SIZE {
        let digest = Sha256::digest(key);
        block[..digest.len()].copy_from_slice(&digest);
    } else {
        block[..key.len()].copy_from_slice(key);
    }

    let mut inner_pad = [0x36u8; HMAC_BLOCK_SIZE];
    let mut outer_pad = [0x5cu8; HMAC_BLOCK_SIZE];
    for i in 0..HMAC_BLOCK_SIZE {
        inner_pad[i] ^= block[i];
        outer_pad[i] ^= block[i];
    }

    let inner = Sha256::new()
        .chain_update(inner_pad)
        .chain_update(message)
        .finalize();

    Sha256::new()
        .chain_update(outer_pad)
        .chain_update(inner)
        .finalize()
        .into()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::TokenSigner;
    use crate::error::AppError;
    use crate::models::user::Role;

    #[test]
    fn issued_token_round_trips() {
        let signer = TokenSigner::new("test-secret", 1);
        let subject = Uuid::new_v4();

        let token = signer.issue(subject, Role::Customer).unwrap();
        let identity = signer.verify(&token).unwrap();

        assert_eq!(identity.id, subject);
        assert_eq!(identity.role, Role::Customer);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let signer = TokenSigner::new("test-secret", 1);
        let other = TokenSigner::new("other-secret", 1);

        let token = other.issue(Uuid::new_v4(), Role::ShopOwner).unwrap();

        assert!(matches!(
            signer.verify(&token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = TokenSigner::new("test-secret", 1);
        let token = signer.issue(Uuid::new_v4(), Role::Customer).unwrap();

        let (payload, signature) = token.split_once('.').unwrap();
        let mut swapped = payload.to_string();
        swapped.replace_range(0..1, if payload.starts_with('A') { "B" } else { "A" });

        assert!(matches!(
            signer.verify(&format!("{swapped}.{signature}")),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", 0);
        let token = signer.issue(Uuid::new_v4(), Role::Customer).unwrap();

        match signer.verify(&token) {
            Err(AppError::Unauthenticated(msg)) => assert!(msg.contains("expired")),
            other => panic!("expected expired token error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", 1);
        assert!(signer.verify("not-a-token").is_err());
        assert!(signer.verify("a.b.c").is_err());
        assert!(signer.verify("").is_err());
    }
}
