use crate::error::{NanoError, Result};
use blake2b_simd::Params as Blake2bParams;
use ring::rand::{SecureRandom, SystemRandom};

/// Output length of the generic hash when none is requested
pub const DEFAULT_HASH_LEN: usize = 32;

/// Variable-length Blake2b over several buffers, without concatenating them
pub fn blake2b_digest(output_len: usize, parts: &[&[u8]]) -> Result<Vec<u8>> {
    if !(1..=64).contains(&output_len) {
        return Err(NanoError::format(format!(
            "hash output length must be between 1 and 64 bytes, got {output_len}"
        )));
    }
    let mut state = Blake2bParams::new().hash_length(output_len).to_state();
    for part in parts {
        state.update(part);
    }
    Ok(state.finalize().as_bytes().to_vec())
}

/// 32-byte Blake2b, used for block hashes and seed derivation
pub fn blake2b_256(parts: &[&[u8]]) -> [u8; 32] {
    fixed_digest::<32>(parts)
}

/// 5-byte Blake2b, used for address checksums
pub fn blake2b_40(parts: &[&[u8]]) -> [u8; 5] {
    fixed_digest::<5>(parts)
}

/// 8-byte Blake2b, used for proof-of-work difficulty
pub fn blake2b_64(parts: &[&[u8]]) -> [u8; 8] {
    fixed_digest::<8>(parts)
}

fn fixed_digest<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut state = Blake2bParams::new().hash_length(N).to_state();
    for part in parts {
        state.update(part);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(state.finalize().as_bytes());
    out
}

/// Fill 32 bytes from the system CSPRNG
pub fn random_bytes32() -> Result<[u8; 32]> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|e| NanoError::Crypto(format!("System randomness unavailable: {e}")))?;
    Ok(bytes)
}
