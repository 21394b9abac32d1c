//! `FileStore`: a TOML-backed `PersistentStore` for host/simulation use
//! (§6.1). Reads happen against an in-memory snapshot guarded by a
//! `tokio::sync::RwLock`; writes persist to disk through `tokio::fs`, which
//! already runs the blocking file call on its own thread pool, so the
//! `async fn` surface in §6.1 does real non-blocking I/O end to end.

use crate::error::{ConfigError, ConfigResult};
use crate::store::{ConfigKey, FactoryKey, PersistentStore, StoreValue};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FactorySection {
    serial_number: Option<String>,
    manufacturing_date: Option<String>,
    pairing_code: Option<String>,
    device_id: Option<u64>,
    device_certificate: Option<Vec<u8>>,
    device_private_key: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigSection {
    fabric_id: Option<u64>,
    service_id: Option<u64>,
    service_config: Option<Vec<u8>>,
    paired_account_id: Option<String>,
    wifi_station_security_type: Option<u32>,
    fabric_secret: Option<Vec<u8>>,
    fail_safe_armed: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FileStoreData {
    #[serde(default)]
    factory: FactorySection,
    #[serde(default)]
    config: ConfigSection,
    #[serde(default)]
    counters: HashMap<String, u32>,
}

pub struct FileStore {
    path: PathBuf,
    data: RwLock<FileStoreData>,
}

impl FileStore {
    /// Opens (or initializes, if absent) the TOML file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
            toml::from_str(&contents)?
        } else {
            FileStoreData::default()
        };
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    async fn persist(&self, data: &FileStoreData) -> ConfigResult<()> {
        let rendered = toml::to_string_pretty(data)?;
        let path = self.path.clone();
        tokio::fs::write(&path, rendered)
            .await
            .map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        debug!(path = %self.path.display(), "persisted store");
        Ok(())
    }
}

fn missing(namespace: &'static str, key: impl Into<String>) -> ConfigError {
    ConfigError::NotFound {
        namespace,
        key: key.into(),
    }
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn factory_get(&self, key: FactoryKey) -> ConfigResult<StoreValue> {
        let data = self.data.read().await;
        let f = &data.factory;
        match key {
            FactoryKey::SerialNumber => f
                .serial_number
                .clone()
                .map(StoreValue::Text)
                .ok_or_else(|| missing("factory", "serial_number")),
            FactoryKey::ManufacturingDate => f
                .manufacturing_date
                .clone()
                .map(StoreValue::Text)
                .ok_or_else(|| missing("factory", "manufacturing_date")),
            FactoryKey::PairingCode => f
                .pairing_code
                .clone()
                .map(StoreValue::Text)
                .ok_or_else(|| missing("factory", "pairing_code")),
            FactoryKey::DeviceId => f
                .device_id
                .map(StoreValue::U64)
                .ok_or_else(|| missing("factory", "device_id")),
            FactoryKey::DeviceCertificate => f
                .device_certificate
                .clone()
                .map(StoreValue::Bytes)
                .ok_or_else(|| missing("factory", "device_certificate")),
            FactoryKey::DevicePrivateKey => f
                .device_private_key
                .clone()
                .map(StoreValue::Bytes)
                .ok_or_else(|| missing("factory", "device_private_key")),
        }
    }

    async fn config_get(&self, key: ConfigKey) -> ConfigResult<StoreValue> {
        let data = self.data.read().await;
        let c = &data.config;
        match key {
            ConfigKey::FabricId => c
                .fabric_id
                .map(StoreValue::U64)
                .ok_or_else(|| missing("config", "fabric_id")),
            ConfigKey::ServiceId => c
                .service_id
                .map(StoreValue::U64)
                .ok_or_else(|| missing("config", "service_id")),
            ConfigKey::ServiceConfig => c
                .service_config
                .clone()
                .map(StoreValue::Bytes)
                .ok_or_else(|| missing("config", "service_config")),
            ConfigKey::PairedAccountId => c
                .paired_account_id
                .clone()
                .map(StoreValue::Text)
                .ok_or_else(|| missing("config", "paired_account_id")),
            ConfigKey::WifiStationSecurityType => c
                .wifi_station_security_type
                .map(StoreValue::U32)
                .ok_or_else(|| missing("config", "wifi_station_security_type")),
            ConfigKey::FabricSecret => c
                .fabric_secret
                .clone()
                .map(StoreValue::Bytes)
                .ok_or_else(|| missing("config", "fabric_secret")),
            ConfigKey::FailSafeArmed => Ok(StoreValue::U32(c.fail_safe_armed.unwrap_or(0))),
        }
    }

    async fn config_set(&self, key: ConfigKey, value: StoreValue) -> ConfigResult<()> {
        let snapshot = {
            let mut data = self.data.write().await;
            let c = &mut data.config;
            match key {
                ConfigKey::FabricId => c.fabric_id = value.as_u64(),
                ConfigKey::ServiceId => c.service_id = value.as_u64(),
                ConfigKey::ServiceConfig => c.service_config = value.as_bytes().map(<[u8]>::to_vec),
                ConfigKey::PairedAccountId => c.paired_account_id = value.as_text().map(str::to_owned),
                ConfigKey::WifiStationSecurityType => c.wifi_station_security_type = value.as_u32(),
                ConfigKey::FabricSecret => c.fabric_secret = value.as_bytes().map(<[u8]>::to_vec),
                ConfigKey::FailSafeArmed => c.fail_safe_armed = value.as_u32(),
            }
            data.clone()
        };
        self.persist(&snapshot).await
    }

    async fn counter_get(&self, name: &str) -> ConfigResult<u32> {
        let data = self.data.read().await;
        data.counters
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::CounterNotFound(name.to_string()))
    }

    async fn counter_increment(&self, name: &str) -> ConfigResult<u32> {
        let snapshot = {
            let mut data = self.data.write().await;
            let counter = data.counters.entry(name.to_string()).or_insert(0);
            *counter = counter
                .checked_add(1)
                .ok_or_else(|| ConfigError::CounterOverflow(name.to_string()))?;
            data.clone()
        };
        self.persist(&snapshot).await?;
        Ok(*snapshot.counters.get(name).expect("just inserted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_key_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.toml")).await.unwrap();
        let err = store.factory_get(FactoryKey::SerialNumber).await.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[tokio::test]
    async fn config_set_then_get_round_trips_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        let store = FileStore::open(&path).await.unwrap();
        store
            .config_set(ConfigKey::FabricId, StoreValue::U64(0xCAFE))
            .await
            .unwrap();
        let value = store.config_get(ConfigKey::FabricId).await.unwrap();
        assert_eq!(value.as_u64(), Some(0xCAFE));

        let reopened = FileStore::open(&path).await.unwrap();
        let value = reopened.config_get(ConfigKey::FabricId).await.unwrap();
        assert_eq!(value.as_u64(), Some(0xCAFE));
    }

    #[tokio::test]
    async fn fail_safe_armed_defaults_to_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.toml")).await.unwrap();
        let value = store.config_get(ConfigKey::FailSafeArmed).await.unwrap();
        assert_eq!(value.as_u32(), Some(0));
    }

    #[tokio::test]
    async fn counter_increment_starts_at_one_and_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.toml")).await.unwrap();
        assert_eq!(store.counter_increment("boot").await.unwrap(), 1);
        assert_eq!(store.counter_increment("boot").await.unwrap(), 2);
        assert_eq!(store.counter_get("boot").await.unwrap(), 2);
    }
}
