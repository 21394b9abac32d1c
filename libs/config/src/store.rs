//! The `PersistentStore` provider trait (§6.1): the core depends on this
//! trait, never on a concrete NVS/flash implementation.

use crate::error::ConfigResult;
use async_trait::async_trait;

/// Keys in the *factory* namespace (§6): provisioned once at manufacture,
/// read-mostly thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryKey {
    SerialNumber,
    ManufacturingDate,
    PairingCode,
    DeviceId,
    DeviceCertificate,
    DevicePrivateKey,
}

/// Keys in the *config* namespace (§6): runtime/provisioning state that
/// changes over the device's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    FabricId,
    ServiceId,
    ServiceConfig,
    PairedAccountId,
    WifiStationSecurityType,
    FabricSecret,
    FailSafeArmed,
}

/// A value read from or written to the store. Namespace keys each have one
/// natural shape; this small tagged union avoids a `PersistentStore` with a
/// distinct method per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreValue {
    Bytes(Vec<u8>),
    Text(String),
    U32(u32),
    U64(u64),
}

impl StoreValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            StoreValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoreValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            StoreValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            StoreValue::U64(v) => Some(*v),
            _ => None,
        }
    }
}

/// The three namespaces of §6 exposed as a single async trait. Presenting
/// synchronous-from-the-caller's-perspective persistence as `async fn`
/// lets a flash-backed implementation use `spawn_blocking` internally
/// without changing this signature (§5.1).
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn factory_get(&self, key: FactoryKey) -> ConfigResult<StoreValue>;

    async fn config_get(&self, key: ConfigKey) -> ConfigResult<StoreValue>;

    async fn config_set(&self, key: ConfigKey, value: StoreValue) -> ConfigResult<()>;

    async fn counter_get(&self, name: &str) -> ConfigResult<u32>;

    /// Increments the named counter and returns the new value. Counters
    /// are created at zero on first increment.
    async fn counter_increment(&self, name: &str) -> ConfigResult<u32>;
}
