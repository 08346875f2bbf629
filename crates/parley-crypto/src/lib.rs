pub mod codec;
pub mod config;
pub mod error;
pub mod signal;

pub use config::ProvisioningConfig;
pub use error::CryptoError;
pub use signal::PreKeyDirectory;
