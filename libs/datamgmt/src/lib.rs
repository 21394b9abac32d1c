//! Pub/sub data-management layer: trait catalogs, subscription client and
//! handler, and the counter-subscription coupling that gates
//! service-subscription state (§4.4).

pub mod catalog;
pub mod error;
pub mod handle;
pub mod subscription;

pub use catalog::{CatalogElement, DataSink, DataSource, TraitCatalog};
pub use error::{DataMgmtError, DataMgmtResult};
pub use handle::TraitDataHandle;
pub use subscription::{
    ClientState, ResubscribePolicy, ServiceSubscriptionCoupling, ServiceSubscriptionDesiredState,
    SubscriptionClient, SubscriptionEvent, SubscriptionHandler,
};
