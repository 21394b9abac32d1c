//! ECDSA signature verification over the TBS hash computed at load time.

use crate::cert::{Certificate, CurveId, EcdsaSignature, PublicKey};
use ecdsa::hazmat::PrehashSigner;
use ecdsa::signature::Verifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    #[error("TBS hash missing")]
    MissingHash,
    #[error("unsupported public key shape for signature verification")]
    UnsupportedKey,
    #[error("malformed public key encoding")]
    InvalidKey,
    #[error("malformed signature encoding")]
    InvalidSignatureEncoding,
    #[error("signature verification failed")]
    BadSignature,
}

pub fn verify_signature(cert: &Certificate, issuer: &Certificate) -> Result<(), SignError> {
    let tbs_hash = cert.tbs_hash.as_ref().ok_or(SignError::MissingHash)?;
    let PublicKey::Ec { curve, point } = &issuer.public_key else {
        return Err(SignError::UnsupportedKey);
    };

    match curve {
        CurveId::Secp256r1 => {
            use p256::ecdsa::{Signature, VerifyingKey};
            let vk = VerifyingKey::from_sec1_bytes(point).map_err(|_| SignError::InvalidKey)?;
            let sig = Signature::from_scalars(
                to_array::<32>(&cert.signature.r)?,
                to_array::<32>(&cert.signature.s)?,
            )
            .map_err(|_| SignError::InvalidSignatureEncoding)?;
            vk.verify(tbs_hash, &sig).map_err(|_| SignError::BadSignature)
        }
        CurveId::Secp224r1 => {
            use p224::ecdsa::{Signature, VerifyingKey};
            let vk = VerifyingKey::from_sec1_bytes(point).map_err(|_| SignError::InvalidKey)?;
            let sig = Signature::from_scalars(
                to_array::<28>(&cert.signature.r)?,
                to_array::<28>(&cert.signature.s)?,
            )
            .map_err(|_| SignError::InvalidSignatureEncoding)?;
            vk.verify(tbs_hash, &sig).map_err(|_| SignError::BadSignature)
        }
    }
}

fn to_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N], SignError> {
    <[u8; N]>::try_from(bytes).map_err(|_| SignError::InvalidSignatureEncoding)
}

/// Signs `hash` with a raw SEC1 private-key scalar, for the cert-prov
/// client and manufacturer-attestation delegates (§4.6 steps 6-7). The
/// digest is assumed to already match the curve's hash (SHA-256 for P-256,
/// SHA-1 for P-224).
pub fn sign_hash(private_key: &[u8], curve: CurveId, hash: &[u8]) -> Result<EcdsaSignature, SignError> {
    match curve {
        CurveId::Secp256r1 => {
            use p256::ecdsa::{Signature, SigningKey};
            let sk = SigningKey::from_bytes(private_key.into()).map_err(|_| SignError::InvalidKey)?;
            let sig: Signature = PrehashSigner::<Signature>::sign_prehash(&sk, hash)
                .map_err(|_| SignError::InvalidSignatureEncoding)?;
            let (r, s) = sig.split_bytes();
            Ok(EcdsaSignature {
                r: r.to_vec(),
                s: s.to_vec(),
            })
        }
        CurveId::Secp224r1 => {
            use p224::ecdsa::{Signature, SigningKey};
            let sk = SigningKey::from_bytes(private_key.into()).map_err(|_| SignError::InvalidKey)?;
            let sig: Signature = PrehashSigner::<Signature>::sign_prehash(&sk, hash)
                .map_err(|_| SignError::InvalidSignatureEncoding)?;
            let (r, s) = sig.split_bytes();
            Ok(EcdsaSignature {
                r: r.to_vec(),
                s: s.to_vec(),
            })
        }
    }
}

/// Hash the TBS (to-be-signed) bytes with the digest implied by the
/// certificate's signature algorithm, per `LoadCert` (§4.2).
pub fn tbs_hash(tbs_bytes: &[u8], alg: crate::cert::SignatureAlgorithm) -> Vec<u8> {
    use sha1::Digest as _;
    use sha2::Digest as _;
    match alg {
        crate::cert::SignatureAlgorithm::EcdsaWithSha1 => sha1::Sha1::digest(tbs_bytes).to_vec(),
        crate::cert::SignatureAlgorithm::EcdsaWithSha256 => {
            sha2::Sha256::digest(tbs_bytes).to_vec()
        }
    }
}
