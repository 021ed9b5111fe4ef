// Signer Tests
// Recoverable secp256k1 signatures and keypair handling

use tokendash::identity::{keccak256, Keypair, KeypairError, Signature, Signer};

// ============================================================================
// KEYPAIR
// ============================================================================

#[test]
fn test_generate_unique_keypairs() {
    let a = Keypair::generate();
    let b = Keypair::generate();
    assert_ne!(a.address(), b.address());
}

#[test]
fn test_keypair_bytes_roundtrip() {
    let keypair = Keypair::generate();
    let restored = Keypair::from_bytes(&keypair.to_bytes()).unwrap();
    assert_eq!(restored.address(), keypair.address());
}

#[test]
fn test_keypair_from_hex_with_prefix() {
    let plain = Keypair::from_hex("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap();
    let prefixed =
        Keypair::from_hex("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap();
    assert_eq!(plain.address(), prefixed.address());
}

#[test]
fn test_keypair_rejects_wrong_length() {
    let result = Keypair::from_bytes(&[1u8; 16]);
    assert!(matches!(
        result,
        Err(KeypairError::InvalidLength { expected: 32, got: 16 })
    ));
}

#[test]
fn test_keypair_rejects_zero_key() {
    assert!(matches!(
        Keypair::from_bytes(&[0u8; 32]),
        Err(KeypairError::InvalidBytes(_))
    ));
}

#[test]
fn test_keypair_debug_hides_secret() {
    let keypair = Keypair::dev_account(0).unwrap();
    let debug = format!("{:?}", keypair);
    assert!(debug.contains("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
    assert!(!debug.contains("ac0974"));
}

// ============================================================================
// SIGN / RECOVER
// ============================================================================

#[test]
fn test_recover_returns_signer_address() {
    let keypair = Keypair::generate();
    let digest = keccak256(b"transfer 50 tokens");

    let signature = Signer::sign_digest(&keypair, &digest);
    let recovered = Signer::recover(&digest, &signature).unwrap();

    assert_eq!(recovered, keypair.address());
    assert!(signature.recovery_id() <= 1);
}

#[test]
fn test_verify_valid_signature() {
    let keypair = Keypair::generate();
    let digest = keccak256(b"approve");
    let signature = Signer::sign_digest(&keypair, &digest);

    assert!(Signer::verify(&digest, &signature, &keypair.address()));
}

#[test]
fn test_tampered_digest_recovers_other_address() {
    let keypair = Keypair::generate();
    let digest = keccak256(b"original");
    let tampered = keccak256(b"tampered");
    let signature = Signer::sign_digest(&keypair, &digest);

    assert!(!Signer::verify(&tampered, &signature, &keypair.address()));
}

#[test]
fn test_wrong_address_fails_verification() {
    let signer = Keypair::generate();
    let other = Keypair::generate();
    let digest = keccak256(b"message");
    let signature = Signer::sign_digest(&signer, &digest);

    assert!(!Signer::verify(&digest, &signature, &other.address()));
}

#[test]
fn test_signing_is_deterministic() {
    let keypair = Keypair::dev_account(1).unwrap();
    let digest = keccak256(b"same input");

    assert_eq!(
        Signer::sign_digest(&keypair, &digest),
        Signer::sign_digest(&keypair, &digest)
    );
}

#[test]
fn test_signature_rejects_bad_recovery_id() {
    assert!(Signature::from_parts([1u8; 32], [1u8; 32], 4).is_err());
}
