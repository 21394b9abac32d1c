//! DER OBJECT IDENTIFIER encode/decode for the small set of arcs the
//! certificate converter needs (§4.2): standard RDN attributes plus the
//! private enterprise arc Weave-specific ids are carried under.

use crate::der::{self, TAG_OID};
use crate::dn::DnOid;
use crate::error::{CertError, CertResult};

const OID_COMMON_NAME: &[u32] = &[2, 5, 4, 3];
const OID_ORGANIZATION: &[u32] = &[2, 5, 4, 10];
// Private enterprise arc (analogous to how Weave/CHIP mint attribute OIDs
// under their own enterprise number) used for the Weave-id RDN attributes.
const OID_WEAVE_DEVICE_ID: &[u32] = &[1, 3, 6, 1, 4, 1, 41387, 1, 1];
const OID_WEAVE_CA_ID: &[u32] = &[1, 3, 6, 1, 4, 1, 41387, 1, 2];
const OID_WEAVE_SERVICE_ENDPOINT_ID: &[u32] = &[1, 3, 6, 1, 4, 1, 41387, 1, 3];
const OID_WEAVE_SOFTWARE_PUBLISHER_ID: &[u32] = &[1, 3, 6, 1, 4, 1, 41387, 1, 4];

fn arcs_for(oid: &DnOid) -> CertResult<&'static [u32]> {
    Ok(match oid {
        DnOid::CommonName => OID_COMMON_NAME,
        DnOid::Organization => OID_ORGANIZATION,
        DnOid::WeaveDeviceId => OID_WEAVE_DEVICE_ID,
        DnOid::WeaveCaId => OID_WEAVE_CA_ID,
        DnOid::WeaveServiceEndpointId => OID_WEAVE_SERVICE_ENDPOINT_ID,
        DnOid::WeaveSoftwarePublisherId => OID_WEAVE_SOFTWARE_PUBLISHER_ID,
        DnOid::Other(_) => {
            return Err(CertError::UnsupportedEncoding {
                reason: "no DER OID registered for this attribute".into(),
            })
        }
    })
}

pub fn write_oid(out: &mut Vec<u8>, oid: &DnOid) -> CertResult<()> {
    let arcs = arcs_for(oid)?;
    let mut body = Vec::new();
    body.push((arcs[0] * 40 + arcs[1]) as u8);
    for &arc in &arcs[2..] {
        encode_base128(&mut body, arc);
    }
    der::write_tlv(out, TAG_OID, &body);
    Ok(())
}

fn encode_base128(out: &mut Vec<u8>, mut value: u32) {
    let mut stack = [0u8; 5];
    let mut n = 0;
    loop {
        stack[n] = (value & 0x7F) as u8;
        value >>= 7;
        n += 1;
        if value == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let byte = stack[i];
        if i == 0 {
            out.push(byte);
        } else {
            out.push(byte | 0x80);
        }
    }
}

pub fn decode_oid(bytes: &[u8]) -> CertResult<DnOid> {
    let mut arcs = Vec::new();
    if bytes.is_empty() {
        return Err(CertError::UnsupportedEncoding {
            reason: "empty OID".into(),
        });
    }
    arcs.push((bytes[0] / 40) as u32);
    arcs.push((bytes[0] % 40) as u32);
    let mut value: u32 = 0;
    for &b in &bytes[1..] {
        value = (value << 7) | (b & 0x7F) as u32;
        if b & 0x80 == 0 {
            arcs.push(value);
            value = 0;
        }
    }
    for (oid, known) in [
        (DnOid::CommonName, OID_COMMON_NAME),
        (DnOid::Organization, OID_ORGANIZATION),
        (DnOid::WeaveDeviceId, OID_WEAVE_DEVICE_ID),
        (DnOid::WeaveCaId, OID_WEAVE_CA_ID),
        (DnOid::WeaveServiceEndpointId, OID_WEAVE_SERVICE_ENDPOINT_ID),
        (DnOid::WeaveSoftwarePublisherId, OID_WEAVE_SOFTWARE_PUBLISHER_ID),
    ] {
        if arcs == known {
            return Ok(oid);
        }
    }
    Err(CertError::UnsupportedEncoding {
        reason: "unrecognized DER OID".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_name_round_trips() {
        let mut buf = Vec::new();
        write_oid(&mut buf, &DnOid::CommonName).unwrap();
        let parsed = der::parse_tlv(&buf).unwrap();
        assert_eq!(decode_oid(parsed.value).unwrap(), DnOid::CommonName);
    }

    #[test]
    fn weave_device_id_round_trips() {
        let mut buf = Vec::new();
        write_oid(&mut buf, &DnOid::WeaveDeviceId).unwrap();
        let parsed = der::parse_tlv(&buf).unwrap();
        assert_eq!(decode_oid(parsed.value).unwrap(), DnOid::WeaveDeviceId);
    }
}
