// Key material for the deployer and funding identities
// - Ed25519 keypair derivation from configured seeds
// - Sui address derivation
// - Intent-prefixed transaction signing

use base64::{engine::general_purpose::STANDARD, Engine as _};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::Serialize;

use crate::error::{ConnectorError, Result};

type Blake2b256 = Blake2b<U32>;

/// Signature scheme flag for Ed25519, prepended to public keys when hashing addresses
const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for transaction data: scope TransactionData, version V0, app Sui
const INTENT_TRANSACTION: [u8; 3] = [0, 0, 0];

/// Create a domain-separated message for signing
#[inline]
fn domain_separate(domain: &[u8], message: &[u8]) -> Vec<u8> {
    let mut separated = Vec::with_capacity(domain.len() + message.len());
    separated.extend_from_slice(domain);
    separated.extend_from_slice(message);
    separated
}

/// Signature scheme names accepted by `sui_executeTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureScheme {
    #[serde(rename = "ED25519")]
    Ed25519,
}

impl SignatureScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::Ed25519 => "ED25519",
        }
    }
}

/// Transaction bytes together with everything the node needs to verify them.
/// Binary fields are base64 encoded, ready for the wire.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx_bytes: String,
    pub signature: String,
    pub pub_key: String,
    pub scheme: SignatureScheme,
}

/// Signing identity (secret + public) and its on-chain address
pub struct KeyMaterial {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    address: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Generate a fresh random identity
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create from a 32-byte seed
    pub fn from_seed(seed: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&seed))
    }

    /// Derive from raw key bytes.
    ///
    /// Accepted layouts:
    /// - 32 bytes: the seed itself
    /// - 33 bytes: scheme flag `0x00` followed by the seed (Sui keystore)
    /// - 64 bytes: seed followed by its public key (legacy secret key)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let seed: &[u8] = match bytes.len() {
            SECRET_KEY_LENGTH => bytes,
            33 => {
                if bytes[0] != ED25519_FLAG {
                    return Err(ConnectorError::InvalidKeyMaterial(format!(
                        "unsupported signature scheme flag 0x{:02x}",
                        bytes[0]
                    )));
                }
                &bytes[1..]
            }
            64 => &bytes[..SECRET_KEY_LENGTH],
            other => {
                return Err(ConnectorError::InvalidKeyMaterial(format!(
                    "expected 32, 33 or 64 key bytes, got {}",
                    other
                )))
            }
        };

        let mut secret = [0u8; SECRET_KEY_LENGTH];
        secret.copy_from_slice(seed);
        let keys = Self::from_seed(secret);

        if bytes.len() == 64 && bytes[SECRET_KEY_LENGTH..] != keys.verifying_key.to_bytes() {
            return Err(ConnectorError::InvalidKeyMaterial(
                "public key half does not match the secret seed".to_string(),
            ));
        }

        Ok(keys)
    }

    /// Derive from a hex (optionally `0x` prefixed) or base64 encoded key
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        let bytes = if let Some(stripped) = encoded.strip_prefix("0x") {
            hex::decode(stripped)
                .map_err(|e| ConnectorError::InvalidKeyMaterial(format!("bad hex key: {}", e)))?
        } else if !encoded.is_empty() && encoded.chars().all(|c| c.is_ascii_hexdigit()) {
            hex::decode(encoded)
                .map_err(|e| ConnectorError::InvalidKeyMaterial(format!("bad hex key: {}", e)))?
        } else {
            STANDARD
                .decode(encoded)
                .map_err(|e| ConnectorError::InvalidKeyMaterial(format!("bad base64 key: {}", e)))?
        };

        Self::from_bytes(&bytes)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        let address = derive_address(&verifying_key.to_bytes());

        Self {
            signing_key,
            verifying_key,
            address,
        }
    }

    /// On-chain address (`0x` + 64 hex chars)
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Public key bytes
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign base64 transaction bytes returned by a transaction builder method
    pub fn sign_transaction(&self, tx_bytes: &str) -> Result<SignedTransaction> {
        let raw = STANDARD.decode(tx_bytes).map_err(|e| ConnectorError::MalformedResponse {
            method: "txBytes",
            reason: format!("transaction bytes are not base64: {}", e),
        })?;

        let message = domain_separate(&INTENT_TRANSACTION, &raw);
        let signature = self.sign(&message);

        Ok(SignedTransaction {
            tx_bytes: tx_bytes.to_string(),
            signature: STANDARD.encode(signature),
            pub_key: STANDARD.encode(self.public_key()),
            scheme: SignatureScheme::Ed25519,
        })
    }
}

/// Sui address: Blake2b-256 over the scheme flag and the public key
pub fn derive_address(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(public_key);
    format!("0x{}", hex::encode(hasher.finalize()))
}
