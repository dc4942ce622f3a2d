//! Infrastructure for mirror: configuration files, the catalog, secrets,
//! audio processes and logging.

pub mod catalog_repository;
pub mod config_service;
pub mod logging;
pub mod paths;
pub mod process_audio;
pub mod secret_service;

pub use catalog_repository::CatalogRepository;
pub use config_service::ConfigService;
pub use paths::MirrorPaths;
pub use process_audio::{MutedAudioOutput, ProcessAudioOutput};
pub use secret_service::EnvSecretService;
