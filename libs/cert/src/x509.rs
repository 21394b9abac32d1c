//! Bidirectional Weave-certificate <-> X.509 DER conversion (§4.2).
//!
//! `ConvertWeaveCertToX509Cert` / `ConvertX509CertToWeaveCert` round-trip a
//! [`Certificate`] through a minimal hand-rolled DER encoder (`der`, `oid`)
//! rather than a general ASN.1 library: an X.509 certificate only needs a
//! handful of DER shapes (SEQUENCE, INTEGER, BIT STRING, a few string types
//! and two time formats), so there is no ecosystem crate to defer to here
//! that isn't doing strictly less than what's already in this module.

use crate::cert::{
    BasicConstraints, Certificate, CurveId, EcdsaSignature, KeyPurpose, KeyUsage, PublicKey,
    SignatureAlgorithm,
};
use crate::der::{self, TAG_CONTEXT_0, TAG_CONTEXT_3};
use crate::dn::{CertificateKeyId, DistinguishedName, DnOid, DnValue};
use crate::error::{CertError, CertResult};
use crate::oid;
use crate::packed_time::{pack_date, unpack_date, NO_WELL_DEFINED_EXPIRATION};

const GENERALIZED_TIME_NO_EXPIRATION: &str = "99991231235959Z";

/// Converts a loaded certificate to its DER X.509 encoding.
pub fn convert_weave_cert_to_x509(cert: &Certificate) -> CertResult<Vec<u8>> {
    let mut tbs = Vec::new();

    // [0] version: v3
    let mut version_inner = Vec::new();
    der::write_unsigned_integer(&mut version_inner, &[2]);
    der::write_tlv(&mut tbs, TAG_CONTEXT_0, &version_inner);

    der::write_unsigned_integer(&mut tbs, &cert.serial_number);
    write_signature_algorithm(&mut tbs, cert.signature_algorithm);
    write_name(&mut tbs, &cert.issuer)?;
    write_validity(&mut tbs, cert.not_before, cert.not_after);
    write_name(&mut tbs, &cert.subject)?;
    write_subject_public_key_info(&mut tbs, &cert.public_key);
    write_extensions(&mut tbs, cert)?;

    let mut tbs_seq = Vec::new();
    der::write_sequence(&mut tbs_seq, &tbs);

    let mut out = Vec::new();
    let mut cert_body = tbs_seq;
    write_signature_algorithm(&mut cert_body, cert.signature_algorithm);
    write_signature_value(&mut cert_body, &cert.signature);
    der::write_sequence(&mut out, &cert_body);
    Ok(out)
}

/// Parses a DER X.509 certificate back into a [`Certificate`], computing
/// `tbs_hash` over the parsed TBSCertificate region per `LoadCert` (§4.2).
pub fn convert_x509_cert_to_weave(bytes: &[u8]) -> CertResult<Certificate> {
    let outer = der::parse_tlv(bytes)?;
    let mut members = der::iter_members(outer.value);
    let tbs_item = members
        .next()
        .ok_or_else(|| unexpected("missing TBSCertificate"))??;
    let tbs_der = &outer.value[..tbs_item.consumed];
    let sig_alg_item = members.next().ok_or_else(|| unexpected("missing outer sig alg"))??;
    let outer_sig_alg = parse_signature_algorithm(sig_alg_item.value)?;
    let sig_item = members.next().ok_or_else(|| unexpected("missing signature"))??;
    let signature = parse_signature_value(sig_item.value, outer_sig_alg)?;

    let mut tbs_members = der::iter_members(tbs_item.value).peekable();
    if let Some(Ok(first)) = tbs_members.peek() {
        if first.tag == TAG_CONTEXT_0 {
            tbs_members.next();
        }
    }
    let serial_item = tbs_members.next().ok_or_else(|| unexpected("missing serial"))??;
    let serial_number = der::strip_integer_padding(serial_item.value).to_vec();

    let sig_alg_in_tbs = tbs_members.next().ok_or_else(|| unexpected("missing tbs sig alg"))??;
    let signature_algorithm = parse_signature_algorithm(sig_alg_in_tbs.value)?;

    let issuer_item = tbs_members.next().ok_or_else(|| unexpected("missing issuer"))??;
    let issuer = parse_name(issuer_item.value)?;

    let validity_item = tbs_members.next().ok_or_else(|| unexpected("missing validity"))??;
    let (not_before, not_after) = parse_validity(validity_item.value)?;

    let subject_item = tbs_members.next().ok_or_else(|| unexpected("missing subject"))??;
    let subject = parse_name(subject_item.value)?;

    let spki_item = tbs_members.next().ok_or_else(|| unexpected("missing spki"))??;
    let (public_key_algorithm, public_key) = parse_subject_public_key_info(spki_item.value)?;

    let mut subject_key_id = None;
    let mut authority_key_id = None;
    let mut key_usage = KeyUsage::default();
    let mut extended_key_usage = None;
    let mut basic_constraints = None;

    if let Some(Ok(ext_item)) = tbs_members.next() {
        if ext_item.tag == TAG_CONTEXT_3 {
            let seq = der::parse_tlv(ext_item.value)?;
            for ext in der::iter_members(seq.value) {
                let ext = ext?;
                parse_extension(
                    ext.value,
                    &mut subject_key_id,
                    &mut authority_key_id,
                    &mut key_usage,
                    &mut extended_key_usage,
                    &mut basic_constraints,
                )?;
            }
        }
    }

    use sha1::Digest as _;
    use sha2::Digest as _;
    let tbs_hash = Some(match signature_algorithm {
        SignatureAlgorithm::EcdsaWithSha1 => sha1::Sha1::digest(tbs_der).to_vec(),
        SignatureAlgorithm::EcdsaWithSha256 => sha2::Sha256::digest(tbs_der).to_vec(),
    });

    Ok(Certificate {
        serial_number,
        issuer,
        subject,
        not_before,
        not_after,
        public_key_algorithm,
        public_key,
        signature_algorithm,
        signature,
        subject_key_id: subject_key_id
            .ok_or_else(|| unexpected("missing subject key id extension"))?,
        authority_key_id: authority_key_id
            .ok_or_else(|| unexpected("missing authority key id extension"))?,
        key_usage,
        extended_key_usage,
        basic_constraints,
        cert_type: crate::cert::CertType::General,
        is_trusted: false,
        tbs_hash,
    })
}

fn unexpected(reason: &str) -> CertError {
    CertError::UnsupportedEncoding {
        reason: reason.to_string(),
    }
}

fn write_signature_algorithm(out: &mut Vec<u8>, alg: SignatureAlgorithm) {
    let arcs: &[u32] = match alg {
        SignatureAlgorithm::EcdsaWithSha1 => &[1, 2, 840, 10045, 4, 1],
        SignatureAlgorithm::EcdsaWithSha256 => &[1, 2, 840, 10045, 4, 3, 2],
    };
    let mut oid_bytes = Vec::new();
    oid_bytes.push((arcs[0] * 40 + arcs[1]) as u8);
    let mut body = Vec::new();
    for &arc in &arcs[2..] {
        encode_base128(&mut body, arc);
    }
    oid_bytes.extend_from_slice(&body);
    let mut oid_tlv = Vec::new();
    der::write_tlv(&mut oid_tlv, der::TAG_OID, &oid_bytes);
    der::write_sequence(out, &oid_tlv);
}

fn parse_signature_algorithm(value: &[u8]) -> CertResult<SignatureAlgorithm> {
    let oid_item = der::parse_tlv(value)?;
    match oid_item.value {
        [0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x01] => Ok(SignatureAlgorithm::EcdsaWithSha1),
        [0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02] => Ok(SignatureAlgorithm::EcdsaWithSha256),
        _ => Err(unexpected("unrecognized signature algorithm OID")),
    }
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
        out.push(if i == 0 { byte } else { byte | 0x80 });
    }
}

fn write_name(out: &mut Vec<u8>, dn: &DistinguishedName) -> CertResult<()> {
    let mut attr = Vec::new();
    oid::write_oid(&mut attr, &dn.oid)?;
    match &dn.value {
        DnValue::WeaveId(id) => {
            der::write_tlv(&mut attr, der::TAG_UTF8_STRING, format!("{:016X}", id).as_bytes())
        }
        DnValue::Utf8String(s) => der::write_tlv(&mut attr, der::TAG_UTF8_STRING, s.as_bytes()),
        DnValue::PrintableString(s) => {
            der::write_tlv(&mut attr, der::TAG_PRINTABLE_STRING, s.as_bytes())
        }
        DnValue::Ia5String(s) => der::write_tlv(&mut attr, der::TAG_IA5_STRING, s.as_bytes()),
    }
    let mut attr_seq = Vec::new();
    der::write_sequence(&mut attr_seq, &attr);
    let mut rdn_set = Vec::new();
    der::write_tlv(&mut rdn_set, der::TAG_SET, &attr_seq);
    der::write_sequence(out, &rdn_set);
    Ok(())
}

fn parse_name(value: &[u8]) -> CertResult<DistinguishedName> {
    let rdn_set_item = der::iter_members(value)
        .next()
        .ok_or_else(|| unexpected("empty Name"))??;
    let attr_seq_item = der::iter_members(rdn_set_item.value)
        .next()
        .ok_or_else(|| unexpected("empty RDN"))??;
    let mut attr_members = der::iter_members(attr_seq_item.value);
    let oid_item = attr_members.next().ok_or_else(|| unexpected("missing AttributeType"))??;
    let oid = oid::decode_oid(oid_item.value)?;
    let value_item = attr_members
        .next()
        .ok_or_else(|| unexpected("missing AttributeValue"))??;
    let text = std::str::from_utf8(value_item.value)
        .map_err(|_| unexpected("non-UTF8 attribute value"))?;
    let dn_value = match oid {
        DnOid::WeaveDeviceId | DnOid::WeaveCaId | DnOid::WeaveServiceEndpointId
        | DnOid::WeaveSoftwarePublisherId => {
            let id = u64::from_str_radix(text, 16)
                .map_err(|_| unexpected("malformed Weave-id attribute"))?;
            DnValue::WeaveId(id)
        }
        _ => match value_item.tag {
            der::TAG_PRINTABLE_STRING => DnValue::PrintableString(text.to_string()),
            der::TAG_IA5_STRING => DnValue::Ia5String(text.to_string()),
            _ => DnValue::Utf8String(text.to_string()),
        },
    };
    Ok(DistinguishedName { oid, value: dn_value })
}

fn write_validity(out: &mut Vec<u8>, not_before: u32, not_after: u32) {
    let mut validity = Vec::new();
    write_time(&mut validity, not_before);
    write_time(&mut validity, not_after);
    der::write_sequence(out, &validity);
}

fn write_time(out: &mut Vec<u8>, packed_date: u32) {
    if packed_date == NO_WELL_DEFINED_EXPIRATION {
        der::write_tlv(
            out,
            der::TAG_GENERALIZED_TIME,
            GENERALIZED_TIME_NO_EXPIRATION.as_bytes(),
        );
        return;
    }
    let (year, month, day) = unpack_date(packed_date);
    if (1950..2050).contains(&year) {
        let yy = year % 100;
        let s = format!("{:02}{:02}{:02}000000Z", yy, month, day);
        der::write_tlv(out, der::TAG_UTC_TIME, s.as_bytes());
    } else {
        let s = format!("{:04}{:02}{:02}000000Z", year, month, day);
        der::write_tlv(out, der::TAG_GENERALIZED_TIME, s.as_bytes());
    }
}

fn parse_validity(value: &[u8]) -> CertResult<(u32, u32)> {
    let mut members = der::iter_members(value);
    let nb = members.next().ok_or_else(|| unexpected("missing notBefore"))??;
    let na = members.next().ok_or_else(|| unexpected("missing notAfter"))??;
    Ok((parse_time(nb.tag, nb.value)?, parse_time(na.tag, na.value)?))
}

fn parse_time(tag: u8, value: &[u8]) -> CertResult<u32> {
    let s = std::str::from_utf8(value).map_err(|_| unexpected("non-ASCII time"))?;
    if s == GENERALIZED_TIME_NO_EXPIRATION {
        return Ok(NO_WELL_DEFINED_EXPIRATION);
    }
    let (year, month, day) = if tag == der::TAG_UTC_TIME {
        if s.len() < 6 {
            return Err(unexpected("malformed UTCTime"));
        }
        let yy: u16 = s[0..2].parse().map_err(|_| unexpected("malformed UTCTime year"))?;
        let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
        let month: u8 = s[2..4].parse().map_err(|_| unexpected("malformed UTCTime month"))?;
        let day: u8 = s[4..6].parse().map_err(|_| unexpected("malformed UTCTime day"))?;
        (year, month, day)
    } else {
        if s.len() < 8 {
            return Err(unexpected("malformed GeneralizedTime"));
        }
        let year: u16 = s[0..4]
            .parse()
            .map_err(|_| unexpected("malformed GeneralizedTime year"))?;
        let month: u8 = s[4..6]
            .parse()
            .map_err(|_| unexpected("malformed GeneralizedTime month"))?;
        let day: u8 = s[6..8]
            .parse()
            .map_err(|_| unexpected("malformed GeneralizedTime day"))?;
        (year, month, day)
    };
    Ok(pack_date(year, month, day))
}

fn write_subject_public_key_info(out: &mut Vec<u8>, key: &PublicKey) {
    let mut spki = Vec::new();
    match key {
        PublicKey::Ec { curve, point } => {
            let curve_arcs: &[u32] = match curve {
                CurveId::Secp256r1 => &[1, 2, 840, 10045, 3, 1, 7],
                CurveId::Secp224r1 => &[1, 3, 132, 0, 33],
            };
            let mut alg = Vec::new();
            let mut ec_pubkey_oid = Vec::new();
            ec_pubkey_oid.push(1 * 40 + 2);
            let mut ec_pubkey_body = Vec::new();
            for &arc in &[840u32, 10045, 2, 1] {
                encode_base128(&mut ec_pubkey_body, arc);
            }
            ec_pubkey_oid.extend_from_slice(&ec_pubkey_body);
            let mut ec_pubkey_tlv = Vec::new();
            der::write_tlv(&mut ec_pubkey_tlv, der::TAG_OID, &ec_pubkey_oid);
            alg.extend_from_slice(&ec_pubkey_tlv);

            let mut curve_oid = Vec::new();
            curve_oid.push((curve_arcs[0] * 40 + curve_arcs[1]) as u8);
            let mut curve_body = Vec::new();
            for &arc in &curve_arcs[2..] {
                encode_base128(&mut curve_body, arc);
            }
            curve_oid.extend_from_slice(&curve_body);
            der::write_tlv(&mut alg, der::TAG_OID, &curve_oid);

            der::write_sequence(&mut spki, &alg);
            der::write_bit_string(&mut spki, point);
        }
        PublicKey::Rsa { modulus, exponent } => {
            let mut rsa_oid = Vec::new();
            rsa_oid.push(1 * 40 + 2);
            let mut body = Vec::new();
            for &arc in &[840u32, 113549, 1, 1, 1] {
                encode_base128(&mut body, arc);
            }
            rsa_oid.extend_from_slice(&body);
            let mut alg = Vec::new();
            der::write_tlv(&mut alg, der::TAG_OID, &rsa_oid);
            der::write_tlv(&mut alg, der::TAG_NULL, &[]);
            der::write_sequence(&mut spki, &alg);

            let mut key_seq_members = Vec::new();
            der::write_unsigned_integer(&mut key_seq_members, modulus);
            der::write_unsigned_integer(&mut key_seq_members, exponent);
            let mut key_seq = Vec::new();
            der::write_sequence(&mut key_seq, &key_seq_members);
            der::write_bit_string(&mut spki, &key_seq);
        }
    }
    der::write_sequence(out, &spki);
}

fn parse_subject_public_key_info(value: &[u8]) -> CertResult<(CurveId, PublicKey)> {
    let mut members = der::iter_members(value);
    let alg_item = members.next().ok_or_else(|| unexpected("missing spki algorithm"))??;
    let bits_item = members.next().ok_or_else(|| unexpected("missing spki bits"))??;
    if bits_item.value.is_empty() {
        return Err(unexpected("empty BIT STRING"));
    }
    let point = bits_item.value[1..].to_vec();

    let mut alg_members = der::iter_members(alg_item.value);
    let _alg_oid = alg_members.next().ok_or_else(|| unexpected("missing key algorithm oid"))??;
    let curve_item = alg_members
        .next()
        .ok_or_else(|| unexpected("missing EC curve parameter"))??;
    let curve = match curve_item.value {
        [0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07] => CurveId::Secp256r1,
        [0x2B, 0x81, 0x04, 0x00, 0x21] => CurveId::Secp224r1,
        _ => return Err(unexpected("unsupported EC curve OID")),
    };
    Ok((curve, PublicKey::Ec { curve, point }))
}

fn write_signature_value(out: &mut Vec<u8>, sig: &EcdsaSignature) {
    let mut seq = Vec::new();
    der::write_unsigned_integer(&mut seq, &sig.r);
    der::write_unsigned_integer(&mut seq, &sig.s);
    let mut sig_der = Vec::new();
    der::write_sequence(&mut sig_der, &seq);
    der::write_bit_string(out, &sig_der);
}

fn parse_signature_value(value: &[u8], _alg: SignatureAlgorithm) -> CertResult<EcdsaSignature> {
    if value.is_empty() {
        return Err(unexpected("empty signature BIT STRING"));
    }
    let sig_der = &value[1..];
    let seq_item = der::parse_tlv(sig_der)?;
    let mut members = der::iter_members(seq_item.value);
    let r_item = members.next().ok_or_else(|| unexpected("missing signature r"))??;
    let s_item = members.next().ok_or_else(|| unexpected("missing signature s"))??;
    Ok(EcdsaSignature {
        r: der::strip_integer_padding(r_item.value).to_vec(),
        s: der::strip_integer_padding(s_item.value).to_vec(),
    })
}

const OID_SUBJECT_KEY_ID: &[u8] = &[0x55, 0x1D, 0x0E];
const OID_AUTHORITY_KEY_ID: &[u8] = &[0x55, 0x1D, 0x23];
const OID_KEY_USAGE: &[u8] = &[0x55, 0x1D, 0x0F];
const OID_EXT_KEY_USAGE: &[u8] = &[0x55, 0x1D, 0x25];
const OID_BASIC_CONSTRAINTS: &[u8] = &[0x55, 0x1D, 0x13];

fn write_extensions(out: &mut Vec<u8>, cert: &Certificate) -> CertResult<()> {
    let mut extensions = Vec::new();

    write_extension(&mut extensions, OID_SUBJECT_KEY_ID, &{
        let mut v = Vec::new();
        der::write_tlv(&mut v, der::TAG_OCTET_STRING, cert.subject_key_id.as_bytes());
        v
    });
    write_extension(&mut extensions, OID_AUTHORITY_KEY_ID, &{
        let mut inner = Vec::new();
        der::write_tlv(&mut inner, TAG_CONTEXT_0, cert.authority_key_id.as_bytes());
        let mut seq = Vec::new();
        der::write_sequence(&mut seq, &inner);
        let mut v = Vec::new();
        der::write_tlv(&mut v, der::TAG_OCTET_STRING, &seq);
        v
    });

    let bits = cert.key_usage.to_wire();
    let ku_bytes = [(bits & 0xFF) as u8, ((bits >> 8) & 0xFF) as u8];
    let unused_bits = 16 - format!("{:b}", bits.max(1)).len() as u8;
    write_extension(&mut extensions, OID_KEY_USAGE, &{
        let mut bit_string = Vec::new();
        bit_string.push(unused_bits.min(7));
        bit_string.push(ku_bytes[0]);
        if ku_bytes[1] != 0 {
            bit_string.push(ku_bytes[1]);
        }
        let mut v = Vec::new();
        der::write_tlv(&mut v, der::TAG_BIT_STRING, &bit_string);
        let mut wrapped = Vec::new();
        der::write_tlv(&mut wrapped, der::TAG_OCTET_STRING, &v);
        wrapped
    });

    if let Some(eku) = &cert.extended_key_usage {
        write_extension(&mut extensions, OID_EXT_KEY_USAGE, &{
            let mut purposes = Vec::new();
            let table: &[(bool, &[u32])] = &[
                (eku.server_auth, &[1, 3, 6, 1, 5, 5, 7, 3, 1]),
                (eku.client_auth, &[1, 3, 6, 1, 5, 5, 7, 3, 2]),
                (eku.code_signing, &[1, 3, 6, 1, 5, 5, 7, 3, 3]),
                (eku.email_protection, &[1, 3, 6, 1, 5, 5, 7, 3, 4]),
                (eku.time_stamping, &[1, 3, 6, 1, 5, 5, 7, 3, 8]),
            ];
            for (set, arcs) in table {
                if *set {
                    let mut oid_bytes = Vec::new();
                    oid_bytes.push((arcs[0] * 40 + arcs[1]) as u8);
                    let mut body = Vec::new();
                    for &arc in &arcs[2..] {
                        encode_base128(&mut body, arc);
                    }
                    oid_bytes.extend_from_slice(&body);
                    der::write_tlv(&mut purposes, der::TAG_OID, &oid_bytes);
                }
            }
            let mut seq = Vec::new();
            der::write_sequence(&mut seq, &purposes);
            let mut v = Vec::new();
            der::write_tlv(&mut v, der::TAG_OCTET_STRING, &seq);
            v
        });
    }

    if let Some(bc) = &cert.basic_constraints {
        write_extension(&mut extensions, OID_BASIC_CONSTRAINTS, &{
            let mut inner = Vec::new();
            if bc.is_ca {
                der::write_tlv(&mut inner, 0x01, &[0xFF]);
            }
            if let Some(plc) = bc.path_len_constraint {
                der::write_unsigned_integer(&mut inner, &[plc]);
            }
            let mut seq = Vec::new();
            der::write_sequence(&mut seq, &inner);
            let mut v = Vec::new();
            der::write_tlv(&mut v, der::TAG_OCTET_STRING, &seq);
            v
        });
    }

    let mut ext_seq = Vec::new();
    der::write_sequence(&mut ext_seq, &extensions);
    der::write_tlv(out, TAG_CONTEXT_3, &ext_seq);
    Ok(())
}

fn write_extension(out: &mut Vec<u8>, oid_bytes: &[u8], octet_string_tlv: &[u8]) {
    let mut oid_tlv = Vec::new();
    der::write_tlv(&mut oid_tlv, der::TAG_OID, oid_bytes);
    let mut ext = oid_tlv;
    ext.extend_from_slice(octet_string_tlv);
    der::write_sequence(out, &ext);
}

#[allow(clippy::too_many_arguments)]
fn parse_extension(
    value: &[u8],
    subject_key_id: &mut Option<CertificateKeyId>,
    authority_key_id: &mut Option<CertificateKeyId>,
    key_usage: &mut KeyUsage,
    extended_key_usage: &mut Option<KeyPurpose>,
    basic_constraints: &mut Option<BasicConstraints>,
) -> CertResult<()> {
    let mut members = der::iter_members(value);
    let oid_item = members.next().ok_or_else(|| unexpected("missing extension oid"))??;
    let mut next = members.next().ok_or_else(|| unexpected("missing extnValue"))??;
    if next.tag == 0x01 {
        next = members.next().ok_or_else(|| unexpected("missing extnValue"))??;
    }
    let octet_item = der::parse_tlv(next.value)?;
    let payload = octet_item.value;

    match oid_item.value {
        v if v == OID_SUBJECT_KEY_ID => {
            let item = der::parse_tlv(payload)?;
            *subject_key_id = CertificateKeyId::new(item.value.to_vec());
        }
        v if v == OID_AUTHORITY_KEY_ID => {
            let seq = der::parse_tlv(payload)?;
            for m in der::iter_members(seq.value) {
                let m = m?;
                if m.tag == TAG_CONTEXT_0 {
                    *authority_key_id = CertificateKeyId::new(m.value.to_vec());
                }
            }
        }
        v if v == OID_KEY_USAGE => {
            let item = der::parse_tlv(payload)?;
            let bytes = &item.value[1.min(item.value.len())..];
            let bits = bytes.first().copied().unwrap_or(0) as u16
                | (bytes.get(1).copied().unwrap_or(0) as u16) << 8;
            *key_usage = KeyUsage::from_wire(bits);
        }
        v if v == OID_EXT_KEY_USAGE => {
            let seq = der::parse_tlv(payload)?;
            let mut eku = KeyPurpose::default();
            for m in der::iter_members(seq.value) {
                let m = m?;
                match m.value {
                    [0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x01] => eku.server_auth = true,
                    [0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x02] => eku.client_auth = true,
                    [0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x03] => eku.code_signing = true,
                    [0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x04] => eku.email_protection = true,
                    [0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x08] => eku.time_stamping = true,
                    _ => {}
                }
            }
            *extended_key_usage = Some(eku);
        }
        v if v == OID_BASIC_CONSTRAINTS => {
            let seq = der::parse_tlv(payload)?;
            let mut is_ca = false;
            let mut path_len_constraint = None;
            for m in der::iter_members(seq.value) {
                let m = m?;
                if m.tag == 0x01 {
                    is_ca = m.value == [0xFF];
                } else if m.tag == der::TAG_INTEGER {
                    path_len_constraint = m.value.first().copied();
                }
            }
            *basic_constraints = Some(BasicConstraints {
                is_ca,
                path_len_constraint,
            });
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::CertType;
    use crate::dn::DnOid;

    fn sample_cert() -> Certificate {
        Certificate {
            serial_number: vec![0x01],
            issuer: DistinguishedName::weave_id(DnOid::WeaveCaId, 0x18B4_3002_0000_0001),
            subject: DistinguishedName::weave_id(DnOid::WeaveDeviceId, 0x18B4_3000_0000_00AA),
            not_before: pack_date(2023, 6, 1),
            not_after: pack_date(2028, 6, 1),
            public_key_algorithm: CurveId::Secp256r1,
            public_key: PublicKey::Ec {
                curve: CurveId::Secp256r1,
                point: vec![0x04; 65],
            },
            signature_algorithm: SignatureAlgorithm::EcdsaWithSha256,
            signature: EcdsaSignature {
                r: vec![0x11; 32],
                s: vec![0x22; 32],
            },
            subject_key_id: CertificateKeyId::new(vec![0xAA; 20]).unwrap(),
            authority_key_id: CertificateKeyId::new(vec![0xBB; 20]).unwrap(),
            key_usage: KeyUsage {
                digital_signature: true,
                ..Default::default()
            },
            extended_key_usage: Some(KeyPurpose {
                client_auth: true,
                ..Default::default()
            }),
            basic_constraints: Some(BasicConstraints {
                is_ca: false,
                path_len_constraint: None,
            }),
            cert_type: CertType::Device,
            is_trusted: false,
            tbs_hash: None,
        }
    }

    #[test]
    fn weave_cert_round_trips_through_x509() {
        let cert = sample_cert();
        let der_bytes = convert_weave_cert_to_x509(&cert).unwrap();
        let back = convert_x509_cert_to_weave(&der_bytes).unwrap();
        assert_eq!(back.serial_number, cert.serial_number);
        assert_eq!(back.subject, cert.subject);
        assert_eq!(back.issuer, cert.issuer);
        assert_eq!(back.not_before, cert.not_before);
        assert_eq!(back.not_after, cert.not_after);
        assert_eq!(back.subject_key_id, cert.subject_key_id);
        assert_eq!(back.authority_key_id, cert.authority_key_id);
        assert_eq!(back.key_usage, cert.key_usage);
        assert_eq!(back.signature, cert.signature);
    }

    #[test]
    fn no_well_defined_expiration_round_trips_to_generalized_time_sentinel() {
        let mut cert = sample_cert();
        cert.not_after = NO_WELL_DEFINED_EXPIRATION;
        let der_bytes = convert_weave_cert_to_x509(&cert).unwrap();
        let back = convert_x509_cert_to_weave(&der_bytes).unwrap();
        assert_eq!(back.not_after, NO_WELL_DEFINED_EXPIRATION);
    }
}
