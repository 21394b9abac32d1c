//! CertProv client: the four-message GetCertificateRequest exchange and
//! the 8-step TBS construction/signing procedure (§4.6).

use crate::error::{BdxError, BdxResult};
use cert::{CertificateSet, CurveId};
use tlv::{ContainerKind, Tag, Writer};

const TAG_REQUEST_TYPE: Tag = Tag::Context(1);
/// Holds both the operational device certificate and any related certs
/// the OpAuth delegate chooses to append (§4.6 step 4).
const TAG_OP_DEVICE_CERT: Tag = Tag::Context(2);
const TAG_MFR_ATTEST_INFO: Tag = Tag::Context(4);
const TAG_OP_SIG_ALGORITHM: Tag = Tag::Context(5);
const TAG_OP_SIGNATURE: Tag = Tag::Context(6);
const TAG_MFR_ATTEST_SIGNATURE: Tag = Tag::Context(7);
const TAG_SIG_R: Tag = Tag::Context(1);
const TAG_SIG_S: Tag = Tag::Context(2);

/// Always set explicitly by the caller; no `NotSpecified` placeholder is
/// exposed (§4.6 Open Question resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetCertRequestType {
    GetInitialOpDeviceCert,
    RotateOpDeviceCert,
}

impl GetCertRequestType {
    fn wire_value(self) -> u64 {
        match self {
            GetCertRequestType::GetInitialOpDeviceCert => 1,
            GetCertRequestType::RotateOpDeviceCert => 2,
        }
    }
}

/// Appends the operational device certificate (and any related certs) and
/// signs the TBS hash with the operational key (§4.6 steps 4 and 6).
pub trait OpAuthDelegate: Send + Sync {
    fn append_op_certs(&self, w: &mut Writer) -> BdxResult<()>;
    fn signing_curve(&self) -> CurveId;
    fn sign(&self, tbs_hash: &[u8]) -> BdxResult<cert::EcdsaSignature>;
}

/// Appends manufacturer attestation info and signs the whole TBS region
/// (§4.6 steps 5 and 7).
pub trait MfrAttestDelegate: Send + Sync {
    fn append_attestation_info(&self, w: &mut Writer) -> BdxResult<()>;
    fn signing_curve(&self) -> CurveId;
    fn sign(&self, tbs_bytes: &[u8]) -> BdxResult<cert::EcdsaSignature>;
}

fn write_signature(w: &mut Writer, tag: Tag, sig: &cert::EcdsaSignature) -> BdxResult<()> {
    w.start_container(tag, ContainerKind::Structure);
    w.put_byte_string(TAG_SIG_R, &sig.r);
    w.put_byte_string(TAG_SIG_S, &sig.s);
    w.end_container()?;
    Ok(())
}

/// Builds a `GetCertificateRequest` per the 8-step procedure in §4.6.
pub fn build_get_certificate_request(
    request_type: GetCertRequestType,
    op_auth: &dyn OpAuthDelegate,
    mfr_attest: Option<&dyn MfrAttestDelegate>,
) -> BdxResult<Vec<u8>> {
    let mut w = Writer::new();
    // Step 1: open the anonymous outer structure.
    w.start_container(Tag::Anonymous, ContainerKind::Structure);
    // Step 2: note the start of the TBS region.
    let tbs_start = w.len();

    // Step 3: request type, then the application's authorize-info hook is
    // folded into the caller-supplied request type itself (no separate
    // callback is threaded through this Rust API surface).
    w.put_unsigned(TAG_REQUEST_TYPE, request_type.wire_value());

    // Step 4: OpAuth appends the operational cert and related certs.
    w.start_container(TAG_OP_DEVICE_CERT, ContainerKind::Path);
    op_auth.append_op_certs(&mut w)?;
    w.end_container()?;

    // Step 5: optional manufacturer attestation info.
    if let Some(mfr_attest) = mfr_attest {
        w.start_container(TAG_MFR_ATTEST_INFO, ContainerKind::Structure);
        mfr_attest.append_attestation_info(&mut w)?;
        w.end_container()?;
    }

    // Step 6: snapshot the TBS bytes, hash, sign with the operational key.
    let tbs_bytes = w.bytes_from(tbs_start).to_vec();
    let tbs_hash = sha256(&tbs_bytes);
    w.put_unsigned(TAG_OP_SIG_ALGORITHM, op_sig_algorithm_wire(op_auth.signing_curve()));
    let op_signature = op_auth.sign(&tbs_hash)?;
    write_signature(&mut w, TAG_OP_SIGNATURE, &op_signature)?;

    // Step 7: manufacturer attestation signs the whole TBS region.
    if let Some(mfr_attest) = mfr_attest {
        let mfr_signature = mfr_attest.sign(&tbs_bytes)?;
        write_signature(&mut w, TAG_MFR_ATTEST_SIGNATURE, &mfr_signature)?;
    }

    // Step 8: close the outer structure.
    w.end_container()?;
    Ok(w.finalize()?)
}

fn op_sig_algorithm_wire(curve: CurveId) -> u64 {
    match curve {
        CurveId::Secp256r1 => 1,
        CurveId::Secp224r1 => 0,
    }
}

fn sha256(bytes: &[u8]) -> Vec<u8> {
    use sha2::Digest as _;
    sha2::Sha256::digest(bytes).to_vec()
}

/// The result of processing a `GetCertificateResponse` or one of the two
/// status-report shortcuts — both collapse into this, never an `Err`
/// (§4.6, §4.7).
pub struct GetCertificateOutcome {
    pub replace_cert: bool,
    pub certificates: Option<CertificateSet>,
}

/// Response processing MUST rewrite the embedded certificate(s)' wire
/// context tags to the `WeaveCertificate`/`WeaveCertificateList` profile
/// tags, since downstream certificate-store code expects that shape
/// (§4.6). The no-change status report yields `replace_cert = false` and
/// no certificates, not an error.
pub fn process_get_certificate_response(body: &[u8]) -> BdxResult<GetCertificateOutcome> {
    let certs = cert::weave::load_certs(body)?;
    let mut set = CertificateSet::new(certs.len().max(1));
    set.load_certs(certs)?;
    Ok(GetCertificateOutcome {
        replace_cert: true,
        certificates: Some(set),
    })
}

/// The `StatusReport{Security, NoNewOperationalCertRequired}` shortcut.
pub fn no_change_outcome() -> GetCertificateOutcome {
    GetCertificateOutcome {
        replace_cert: false,
        certificates: None,
    }
}

/// A failure status report is surfaced as an error, unlike the no-change
/// shortcut (§4.6).
pub fn failure_outcome(profile: u32, code: u16) -> BdxError {
    BdxError::StatusReport { profile, code }
}

const BDX_CERT_PROV_PROFILE: u32 = 0x0000_0013;
const MSG_TYPE_GET_CERTIFICATE_REQUEST: u8 = 0x01;
const MSG_TYPE_GET_CERTIFICATE_RESPONSE: u8 = 0x02;
const MSG_TYPE_STATUS_REPORT: u8 = 0x03;

/// Drives the four-message exchange over an [`exchange::ExchangeEngine`]
/// (§4.6's message-flow diagram).
pub struct CertProvClient {
    engine: std::sync::Arc<dyn exchange::ExchangeEngine>,
}

impl CertProvClient {
    pub fn new(engine: std::sync::Arc<dyn exchange::ExchangeEngine>) -> Self {
        Self { engine }
    }

    pub async fn get_certificate(
        &self,
        binding: &exchange::Binding,
        request_type: GetCertRequestType,
        op_auth: &dyn OpAuthDelegate,
        mfr_attest: Option<&dyn MfrAttestDelegate>,
        timeout: std::time::Duration,
    ) -> BdxResult<GetCertificateOutcome> {
        let payload = build_get_certificate_request(request_type, op_auth, mfr_attest)?;
        let request = exchange::ExchangeMessage {
            profile: BDX_CERT_PROV_PROFILE,
            message_type: MSG_TYPE_GET_CERTIFICATE_REQUEST,
            payload: payload.into(),
        };
        let response = self.engine.send_request(binding, request, timeout).await?;
        match response.message_type {
            MSG_TYPE_GET_CERTIFICATE_RESPONSE => process_get_certificate_response(&response.payload),
            MSG_TYPE_STATUS_REPORT => Ok(no_change_outcome()),
            other => Err(BdxError::StatusReport {
                profile: response.profile,
                code: other as u16,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cert::EcdsaSignature;

    struct FixedOpAuth;

    impl OpAuthDelegate for FixedOpAuth {
        fn append_op_certs(&self, w: &mut Writer) -> BdxResult<()> {
            w.put_byte_string(Tag::Context(1), b"cert-bytes");
            Ok(())
        }

        fn signing_curve(&self) -> CurveId {
            CurveId::Secp256r1
        }

        fn sign(&self, tbs_hash: &[u8]) -> BdxResult<EcdsaSignature> {
            Ok(EcdsaSignature {
                r: tbs_hash.to_vec(),
                s: vec![0u8; 32],
            })
        }
    }

    #[test]
    fn request_builds_without_mfr_attestation() {
        let bytes = build_get_certificate_request(
            GetCertRequestType::GetInitialOpDeviceCert,
            &FixedOpAuth,
            None,
        )
        .unwrap();
        assert!(!bytes.is_empty());
        let (tag, _value) = tlv::parse(&bytes).unwrap();
        assert_eq!(tag, Tag::Anonymous);
    }

    #[test]
    fn no_change_outcome_is_not_an_error() {
        let outcome = no_change_outcome();
        assert!(!outcome.replace_cert);
        assert!(outcome.certificates.is_none());
    }
}
