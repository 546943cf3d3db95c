//! Local OpenClaw device identity.
//!
//! The identity file is a JSON object `{deviceId, publicKeyPem, privateKeyPem}`
//! holding an Ed25519 key pair (SPKI and PKCS#8 PEM). It is written by the
//! OpenClaw runtime; this crate only ever reads it.

use std::path::{Path, PathBuf};

use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::Deserialize;
use tracing::debug;

use crate::error::{RegistrationError, Result};

#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub verifying_key: VerifyingKey,
    pub signing_key: SigningKey,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFile {
    #[serde(default)]
    device_id: Option<String>,
    #[serde(default)]
    public_key_pem: Option<String>,
    #[serde(default)]
    private_key_pem: Option<String>,
}

/// `~/.openclaw/identity/device.json`
pub fn default_identity_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".openclaw").join("identity").join("device.json"))
}

/// Load the device identity from `path`, or from the default location when
/// no path is given.
pub fn load(path: Option<&Path>) -> Result<DeviceIdentity> {
    let resolved = match path {
        Some(p) => p.to_path_buf(),
        None => default_identity_path().ok_or_else(|| {
            RegistrationError::Config("cannot resolve home directory for identity path".into())
        })?,
    };

    let raw = match std::fs::read_to_string(&resolved) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RegistrationError::IdentityNotFound(resolved));
        }
        Err(e) => return Err(e.into()),
    };
    debug!("loaded identity file {}", resolved.display());

    parse(&raw)
}

fn parse(raw: &str) -> Result<DeviceIdentity> {
    let file: IdentityFile = serde_json::from_str(raw)?;

    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    let mut missing = Vec::new();
    if !present(&file.device_id) {
        missing.push("deviceId");
    }
    if !present(&file.public_key_pem) {
        missing.push("publicKeyPem");
    }
    if !present(&file.private_key_pem) {
        missing.push("privateKeyPem");
    }
    let (Some(device_id), Some(public_pem), Some(private_pem)) =
        (file.device_id, file.public_key_pem, file.private_key_pem)
    else {
        return Err(RegistrationError::InvalidIdentity(missing));
    };
    if !missing.is_empty() {
        return Err(RegistrationError::InvalidIdentity(missing));
    }

    let signing_key = SigningKey::from_pkcs8_pem(&private_pem)
        .map_err(|e| RegistrationError::InvalidKey(format!("privateKeyPem: {e}")))?;
    let verifying_key = VerifyingKey::from_public_key_pem(&public_pem)
        .map_err(|e| RegistrationError::InvalidKey(format!("publicKeyPem: {e}")))?;
    if signing_key.verifying_key() != verifying_key {
        return Err(RegistrationError::InvalidKey(
            "publicKeyPem does not match privateKeyPem".into(),
        ));
    }

    Ok(DeviceIdentity {
        device_id,
        verifying_key,
        signing_key,
    })
}
