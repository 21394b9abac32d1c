//! Bulk data transfer messages (§4.5), the certificate-provisioning
//! client (§4.6), and the software-update exchange (§4.7 — supplemented).

pub mod certprov;
pub mod control;
pub mod error;
pub mod messages;
pub mod metadata;
pub mod swu;

pub use certprov::{
    build_get_certificate_request, failure_outcome, no_change_outcome,
    process_get_certificate_response, CertProvClient, GetCertRequestType, GetCertificateOutcome,
    MfrAttestDelegate, OpAuthDelegate,
};
pub use control::{RangeControl, TransferControl, TransferMode};
pub use error::{BdxError, BdxResult};
pub use messages::{
    BdxMessage, BlockQuery, BlockQueryV1, BlockSend, BlockSendV1, ReceiveAccept, ReceiveInit,
    SendAccept, SendInit,
};
pub use metadata::Metadata;
pub use swu::{ImageAnnounce, ImageQuery, ImageQueryResponse, SoftwareUpdateOutcome, UpdatePriority};
