use crate::identity::{Address, Keypair};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Invalid signature bytes: {0}")]
    InvalidBytes(String),

    #[error("Public key recovery failed: {0}")]
    RecoveryFailed(String),
}

/// Recoverable secp256k1 signature over a 32-byte digest
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: u8,
}

impl Signature {
    /// Build a signature from its parts
    pub fn from_parts(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> Result<Self, SignatureError> {
        if recovery_id > 3 {
            return Err(SignatureError::InvalidRecoveryId(recovery_id));
        }
        Ok(Self { r, s, recovery_id })
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Recovery id (0 or 1 for canonical signatures)
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    fn to_recoverable(&self) -> Result<RecoverableSignature, SignatureError> {
        let recid = RecoveryId::from_i32(self.recovery_id as i32)
            .map_err(|_| SignatureError::InvalidRecoveryId(self.recovery_id))?;
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        RecoverableSignature::from_compact(&compact, recid)
            .map_err(|e| SignatureError::InvalidBytes(e.to_string()))
    }
}

/// Signing and sender recovery
pub struct Signer;

impl Signer {
    /// Sign a 32-byte digest
    pub fn sign_digest(keypair: &Keypair, digest: &[u8; 32]) -> Signature {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(*digest);
        let signature = secp.sign_ecdsa_recoverable(&message, keypair.secret_key());
        let (recid, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        Signature {
            r,
            s,
            recovery_id: recid.to_i32() as u8,
        }
    }

    /// Recover the address that produced `signature` over `digest`
    pub fn recover(digest: &[u8; 32], signature: &Signature) -> Result<Address, SignatureError> {
        let secp = Secp256k1::verification_only();
        let message = Message::from_digest(*digest);
        let recoverable = signature.to_recoverable()?;
        let public_key = secp
            .recover_ecdsa(&message, &recoverable)
            .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;
        Ok(Address::from_public_key(&public_key))
    }

    /// Check that `signature` over `digest` was produced by `address`
    pub fn verify(digest: &[u8; 32], signature: &Signature, address: &Address) -> bool {
        matches!(Self::recover(digest, signature), Ok(recovered) if recovered == *address)
    }
}
