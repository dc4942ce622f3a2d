use anyhow::Result;
use mirror_application::{MirrorApp, bootstrap_with_output};
use mirror_infrastructure::{ConfigService, MutedAudioOutput};
use std::path::PathBuf;

/// Config service for `path`, or for the default location.
pub fn config_service(path: Option<PathBuf>) -> Result<ConfigService> {
    Ok(match path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    })
}

/// Assembles the application without audio; one-shot commands exit before
/// anything could be heard.
pub fn app(config_service: &ConfigService) -> Result<MirrorApp> {
    Ok(bootstrap_with_output(config_service, Box::new(MutedAudioOutput))?)
}
