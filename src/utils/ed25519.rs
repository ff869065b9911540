//! Ed25519 over Blake2b-512
//!
//! The curve, encoding and signature equation are standard Ed25519, but
//! every internal hash (secret expansion, nonce, challenge) is Blake2b
//! with a 64-byte output instead of SHA-512. Keys and signatures are
//! therefore not interchangeable with standard Ed25519 ones.

use blake2b_simd::Params as Blake2bParams;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::{clamp_integer, Scalar};
use zeroize::Zeroize;

pub const PRIVATE_KEY_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

fn hash_512(parts: &[&[u8]]) -> [u8; 64] {
    let mut state = Blake2bParams::new().hash_length(64).to_state();
    for part in parts {
        state.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(state.finalize().as_bytes());
    out
}

/// Secret scalar and nonce prefix expanded from a private key
struct ExpandedSecret {
    scalar: Scalar,
    prefix: [u8; 32],
}

impl ExpandedSecret {
    fn from_private_key(private_key: &[u8; PRIVATE_KEY_LEN]) -> ExpandedSecret {
        let mut expanded = hash_512(&[private_key]);
        let mut lower = [0u8; 32];
        let mut prefix = [0u8; 32];
        lower.copy_from_slice(&expanded[..32]);
        prefix.copy_from_slice(&expanded[32..]);
        expanded.zeroize();

        let scalar = Scalar::from_bytes_mod_order(clamp_integer(lower));
        lower.zeroize();
        ExpandedSecret { scalar, prefix }
    }
}

impl Drop for ExpandedSecret {
    fn drop(&mut self) {
        self.scalar.zeroize();
        self.prefix.zeroize();
    }
}

pub fn derive_public_key(private_key: &[u8; PRIVATE_KEY_LEN]) -> [u8; PUBLIC_KEY_LEN] {
    let secret = ExpandedSecret::from_private_key(private_key);
    EdwardsPoint::mul_base(&secret.scalar).compress().to_bytes()
}

/// Sign the concatenation of `data` without materialising it
pub fn sign(private_key: &[u8; PRIVATE_KEY_LEN], data: &[&[u8]]) -> [u8; SIGNATURE_LEN] {
    let secret = ExpandedSecret::from_private_key(private_key);
    let public_key = EdwardsPoint::mul_base(&secret.scalar).compress();

    let mut nonce_input: Vec<&[u8]> = Vec::with_capacity(data.len() + 1);
    nonce_input.push(&secret.prefix);
    nonce_input.extend_from_slice(data);
    let r = Scalar::from_bytes_mod_order_wide(&hash_512(&nonce_input));
    let big_r = EdwardsPoint::mul_base(&r).compress();

    let k = challenge(&big_r, &public_key, data);
    let s = r + k * secret.scalar;

    let mut signature = [0u8; SIGNATURE_LEN];
    signature[..32].copy_from_slice(big_r.as_bytes());
    signature[32..].copy_from_slice(s.as_bytes());
    signature
}

/// Check a signature. Returns false for a bad signature, a non-canonical
/// `s` component, or a public key that is not a curve point.
pub fn verify(
    public_key: &[u8; PUBLIC_KEY_LEN],
    data: &[&[u8]],
    signature: &[u8; SIGNATURE_LEN],
) -> bool {
    let compressed_a = CompressedEdwardsY(*public_key);
    let a = match compressed_a.decompress() {
        Some(point) => point,
        None => return false,
    };

    let mut r_bytes = [0u8; 32];
    let mut s_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&signature[..32]);
    s_bytes.copy_from_slice(&signature[32..]);
    let big_r = CompressedEdwardsY(r_bytes);
    let s = match Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes)) {
        Some(s) => s,
        None => return false,
    };

    let k = challenge(&big_r, &compressed_a, data);
    // [s]B - [k]A must equal R
    let expected_r = EdwardsPoint::vartime_double_scalar_mul_basepoint(&k, &(-a), &s);
    expected_r.compress() == big_r
}

fn challenge(big_r: &CompressedEdwardsY, public_key: &CompressedEdwardsY, data: &[&[u8]]) -> Scalar {
    let mut input: Vec<&[u8]> = Vec::with_capacity(data.len() + 2);
    input.push(big_r.as_bytes());
    input.push(public_key.as_bytes());
    input.extend_from_slice(data);
    Scalar::from_bytes_mod_order_wide(&hash_512(&input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::HEXUPPER;

    const PRIVATE: &str = "9F0E444C69F77A49BD0BE89DB92C38FE713E0963165CCA12FAF5712D7657120F";
    const PUBLIC: &str = "C008B814A7D269A1FA3C6528B19201A24D797912DB9996FF02A1FF356E45552B";
    const MESSAGE: &[u8] = b"nano block test message";
    const SIGNATURE: &str = "A672C5A294D752E00139E669AB1CF77BBA76341BE558A59FB4BF865AA1AD4A5D\
                             813BD57F3F6735306670E6C3C4966B92F16188160AB557BC84603CC64536C005";

    fn array<const N: usize>(hex: &str) -> [u8; N] {
        let bytes = HEXUPPER.decode(hex.as_bytes()).unwrap();
        bytes.try_into().unwrap()
    }

    #[test]
    fn test_zero_private_key_vector() {
        let public = derive_public_key(&[0u8; 32]);
        assert_eq!(
            HEXUPPER.encode(&public),
            "19D3D919475DEED4696B5D13018151D1AF88B2BD3BCFF048B45031C1F36D1858"
        );
    }

    #[test]
    fn test_derive_public_key_vector() {
        let public = derive_public_key(&array::<32>(PRIVATE));
        assert_eq!(HEXUPPER.encode(&public), PUBLIC);
    }

    #[test]
    fn test_sign_matches_vector() {
        let signature = sign(&array::<32>(PRIVATE), &[MESSAGE]);
        assert_eq!(HEXUPPER.encode(&signature), SIGNATURE);
    }

    #[test]
    fn test_sign_over_split_buffers() {
        let private = array::<32>(PRIVATE);
        let (head, tail) = MESSAGE.split_at(7);
        assert_eq!(sign(&private, &[head, tail]), sign(&private, &[MESSAGE]));
    }

    #[test]
    fn test_verify_accepts_vector() {
        assert!(verify(&array::<32>(PUBLIC), &[MESSAGE], &array::<64>(SIGNATURE)));
    }

    #[test]
    fn test_verify_rejects_single_bit_mutations() {
        let public = array::<32>(PUBLIC);
        let signature = array::<64>(SIGNATURE);

        let mut message = MESSAGE.to_vec();
        message[3] ^= 0x01;
        assert!(!verify(&public, &[&message], &signature));

        for index in [0usize, 31, 32, 40] {
            let mut bad_signature = signature;
            bad_signature[index] ^= 0x01;
            assert!(!verify(&public, &[MESSAGE], &bad_signature));
        }

        let mut bad_public = public;
        bad_public[0] ^= 0x01;
        assert!(!verify(&bad_public, &[MESSAGE], &signature));
    }

    #[test]
    fn test_verify_rejects_invalid_point() {
        // y = 2 has no matching x on the curve
        let mut not_a_point = [0u8; 32];
        not_a_point[0] = 2;
        assert!(CompressedEdwardsY(not_a_point).decompress().is_none());
        assert!(!verify(&not_a_point, &[MESSAGE], &array::<64>(SIGNATURE)));
    }

    #[test]
    fn test_verify_rejects_non_canonical_s() {
        let mut signature = array::<64>(SIGNATURE);
        signature[63] = 0xFF;
        assert!(!verify(&array::<32>(PUBLIC), &[MESSAGE], &signature));
    }
}
