// Transactions - legacy EIP-155 signing and raw encoding

use crate::identity::{keccak256, Address, Keypair, Signature, SignatureError, Signer};
use alloy_primitives::U256;
use alloy_rlp::{BufMut, Encodable, Header, EMPTY_STRING_CODE};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest chain id whose EIP-155 `v` fits in 64 bits (EIP-2294)
pub const MAX_CHAIN_ID: u64 = u64::MAX / 2 - 36;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("Chain id {0} is too large for replay-protected signing")]
    ChainIdTooLarge(u64),
}

/// Transaction hash (keccak-256 of the raw signed transaction)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a `0x`-prefixed hex hash
    pub fn parse(s: &str) -> Option<Self> {
        let body = s.trim().strip_prefix("0x")?;
        let bytes = hex::decode(body).ok()?;
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

/// `chain_id * 2 + 35 + parity`, if it fits
fn eip155_v(chain_id: u64, recovery_id: u8) -> Option<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(35))
        .and_then(|v| v.checked_add(recovery_id as u64))
}

/// Unsigned transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` creates a contract
    pub to: Option<Address>,
    pub value: u128,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl TransactionRequest {
    /// Digest signed under EIP-155 replay protection
    pub fn signing_hash(&self) -> [u8; 32] {
        let payload_length = self.fields_len() + self.chain_id.length() + 2 * 0u8.length();

        let mut out = Vec::with_capacity(payload_length + 3);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.encode_fields(&mut out);
        self.chain_id.encode(&mut out);
        0u8.encode(&mut out);
        0u8.encode(&mut out);

        keccak256(&out).0
    }

    /// Sign with `keypair`
    pub fn sign(self, keypair: &Keypair) -> Result<SignedTransaction, TxError> {
        if self.chain_id > MAX_CHAIN_ID {
            return Err(TxError::ChainIdTooLarge(self.chain_id));
        }
        let signature = Signer::sign_digest(keypair, &self.signing_hash());
        SignedTransaction::from_parts(self, signature)
    }

    fn fields_len(&self) -> usize {
        let to_len = match &self.to {
            Some(address) => address.as_bytes().as_slice().length(),
            None => 1,
        };
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + to_len
            + self.value.length()
            + self.data.as_slice().length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        match &self.to {
            Some(address) => address.as_bytes().as_slice().encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
        self.value.encode(out);
        self.data.as_slice().encode(out);
    }
}

/// Transaction with its signature attached
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    request: TransactionRequest,
    signature: Signature,
    v: u64,
}

impl SignedTransaction {
    pub fn from_parts(request: TransactionRequest, signature: Signature) -> Result<Self, TxError> {
        let v = eip155_v(request.chain_id, signature.recovery_id())
            .filter(|_| request.chain_id <= MAX_CHAIN_ID)
            .ok_or(TxError::ChainIdTooLarge(request.chain_id))?;
        Ok(Self {
            request,
            signature,
            v,
        })
    }

    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// EIP-155 `v` value
    pub fn v(&self) -> u64 {
        self.v
    }

    /// RLP-encoded signed transaction, as submitted to a node
    pub fn raw(&self) -> Vec<u8> {
        let r = U256::from_be_bytes(*self.signature.r());
        let s = U256::from_be_bytes(*self.signature.s());
        let payload_length = self.request.fields_len() + self.v.length() + r.length() + s.length();

        let mut out = Vec::with_capacity(payload_length + 3);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.request.encode_fields(&mut out);
        self.v.encode(&mut out);
        r.encode(&mut out);
        s.encode(&mut out);
        out
    }

    pub fn hash(&self) -> TxHash {
        TxHash(keccak256(self.raw()).0)
    }

    /// Address that signed this transaction
    pub fn recover_sender(&self) -> Result<Address, SignatureError> {
        Signer::recover(&self.request.signing_hash(), &self.signature)
    }
}
