//! Challenge construction: a fresh signed assertion per registration attempt.

use base64::{engine::general_purpose::STANDARD as B64, engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use ed25519_dalek::pkcs8::EncodePublicKey;
use ed25519_dalek::Signer;
use rand::RngCore;

use crate::error::{RegistrationError, Result};
use crate::identity::DeviceIdentity;
use crate::types::Challenge;

const MESSAGE_PREFIX: &str = "clawkey-register";

/// Build a fresh challenge for one registration attempt.
///
/// The message embeds the creation time plus a random suffix, so no two
/// challenges share a message or signature. Ed25519 hashes internally; the
/// message bytes are signed as-is.
pub fn build(identity: &DeviceIdentity) -> Result<Challenge> {
    let timestamp = Utc::now().timestamp_millis();
    let message = format!("{MESSAGE_PREFIX}-{timestamp}-{}", gen_nonce());

    let signature = identity.signing_key.sign(message.as_bytes());
    let public_key_der = identity
        .verifying_key
        .to_public_key_der()
        .map_err(|e| RegistrationError::InvalidKey(format!("SPKI export: {e}")))?;

    Ok(Challenge {
        device_id: identity.device_id.clone(),
        public_key: B64.encode(public_key_der.as_bytes()),
        message,
        signature: B64.encode(signature.to_bytes()),
        timestamp,
    })
}

fn gen_nonce() -> String {
    let mut b = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut b);
    URL_SAFE_NO_PAD.encode(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::pkcs8::DecodePublicKey;
    use ed25519_dalek::{Signature, SigningKey, Verifier, VerifyingKey};
    use rand::rngs::OsRng;

    fn identity() -> DeviceIdentity {
        let signing_key = SigningKey::generate(&mut OsRng);
        DeviceIdentity {
            device_id: "dev-1".into(),
            verifying_key: signing_key.verifying_key(),
            signing_key,
        }
    }

    #[test]
    fn signature_verifies_against_exported_public_key() {
        let id = identity();
        let c = build(&id).unwrap();

        let der = B64.decode(&c.public_key).unwrap();
        let vk = VerifyingKey::from_public_key_der(&der).unwrap();
        assert_eq!(vk, id.verifying_key);

        let sig = Signature::from_slice(&B64.decode(&c.signature).unwrap()).unwrap();
        vk.verify(c.message.as_bytes(), &sig).unwrap();
        assert_eq!(c.device_id, "dev-1");
    }

    #[test]
    fn message_embeds_the_timestamp() {
        let c = build(&identity()).unwrap();
        assert!(c
            .message
            .starts_with(&format!("clawkey-register-{}-", c.timestamp)));
    }

    #[test]
    fn successive_challenges_never_repeat() {
        let id = identity();
        let a = build(&id).unwrap();
        let b = build(&id).unwrap();
        assert_ne!(a.message, b.message);
        assert_ne!(a.signature, b.signature);
    }
}
