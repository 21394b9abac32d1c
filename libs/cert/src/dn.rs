//! Distinguished names and key identifiers (§3).

/// A byte string of 1..20 bytes identifying a public key. Equality is
/// byte-identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateKeyId(Vec<u8>);

impl CertificateKeyId {
    pub fn new(bytes: Vec<u8>) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > 20 {
            return None;
        }
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// The OID namespace a [`DnAttribute`] value is drawn from: Weave reserves a
/// set of OIDs whose values are 64-bit ids rather than strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnOid {
    WeaveDeviceId,
    WeaveCaId,
    WeaveServiceEndpointId,
    WeaveSoftwarePublisherId,
    CommonName,
    Organization,
    /// Any other OID, carried as a dotted string for extensibility.
    Other(&'static str),
}

/// A single attribute of a distinguished name: an OID plus its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DnValue {
    WeaveId(u64),
    Utf8String(String),
    PrintableString(String),
    Ia5String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistinguishedName {
    pub oid: DnOid,
    pub value: DnValue,
}

impl DistinguishedName {
    pub fn weave_id(oid: DnOid, id: u64) -> Self {
        Self {
            oid,
            value: DnValue::WeaveId(id),
        }
    }

    pub fn is_equal(&self, other: &DistinguishedName) -> bool {
        if self.oid != other.oid {
            return false;
        }
        match (&self.value, &other.value) {
            (DnValue::WeaveId(a), DnValue::WeaveId(b)) => a == b,
            (DnValue::Utf8String(a), DnValue::Utf8String(b)) => a == b,
            (DnValue::PrintableString(a), DnValue::PrintableString(b)) => a == b,
            (DnValue::Ia5String(a), DnValue::Ia5String(b)) => a == b,
            _ => false,
        }
    }

    /// True for OIDs whose value is a 64-bit Weave id rather than a string.
    pub fn is_weave_id_attribute(&self) -> bool {
        matches!(
            self.oid,
            DnOid::WeaveDeviceId
                | DnOid::WeaveCaId
                | DnOid::WeaveServiceEndpointId
                | DnOid::WeaveSoftwarePublisherId
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_weave_ids_match() {
        let a = DistinguishedName::weave_id(DnOid::WeaveDeviceId, 0x18B4_3000_0000_00AA);
        let b = DistinguishedName::weave_id(DnOid::WeaveDeviceId, 0x18B4_3000_0000_00AA);
        assert!(a.is_equal(&b));
    }

    #[test]
    fn different_oid_does_not_match() {
        let a = DistinguishedName::weave_id(DnOid::WeaveDeviceId, 1);
        let b = DistinguishedName::weave_id(DnOid::WeaveCaId, 1);
        assert!(!a.is_equal(&b));
    }

    #[test]
    fn key_id_rejects_out_of_range_length() {
        assert!(CertificateKeyId::new(vec![]).is_none());
        assert!(CertificateKeyId::new(vec![0u8; 21]).is_none());
        assert!(CertificateKeyId::new(vec![0u8; 20]).is_some());
    }
}
