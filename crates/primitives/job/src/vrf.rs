//! Identifiers used by randomness-log jobs.
//!
//! These mirror the packing done by the VRF coordinator contract:
//! `keyHash = keccak256(abi.encodePacked(publicKey))` and
//! `requestId = keccak256(abi.encodePacked(keyHash, seed))`, where the public
//! key is the pair of affine secp256k1 coordinates and the seed is a `uint256`.

use alloy_primitives::{keccak256, B256, U256};

/// Hash of an uncompressed public key given by its two coordinates.
pub fn key_hash(x: U256, y: U256) -> B256 {
    let mut packed = [0u8; 64];
    packed[..32].copy_from_slice(&x.to_be_bytes::<32>());
    packed[32..].copy_from_slice(&y.to_be_bytes::<32>());
    keccak256(packed)
}

/// Request id for a randomness request made with the pre-seed `seed`.
pub fn request_id(key_hash: &B256, seed: U256) -> B256 {
    let mut packed = [0u8; 64];
    packed[..32].copy_from_slice(key_hash.as_slice());
    packed[32..].copy_from_slice(&seed.to_be_bytes::<32>());
    keccak256(packed)
}
