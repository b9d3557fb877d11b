pub mod handler;
pub mod models;
pub mod store;

pub use handler::create_config_router;
pub use models::FrpcConfig;
pub use store::{BackupOutcome, ConfigStore, ConfigStoreError};
