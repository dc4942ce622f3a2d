//! Wires configuration, catalog, backend client and audio into a
//! ready-to-use [`CalibrationUseCase`].

use crate::calibration_usecase::CalibrationUseCase;
use mirror_core::Result;
use mirror_core::catalog::CatalogIndex;
use mirror_core::config::MirrorConfig;
use mirror_core::playback::{AudioOutput, PlaybackCoordinator};
use mirror_infrastructure::{
    CatalogRepository, ConfigService, EnvSecretService, MirrorPaths, ProcessAudioOutput,
};
use mirror_interaction::{GeminiCalibrationClient, build_system_instruction};
use std::path::PathBuf;
use std::sync::Arc;

/// The assembled application.
pub struct MirrorApp {
    pub config: MirrorConfig,
    pub usecase: Arc<CalibrationUseCase>,
}

/// Builds the application from the configuration held by `config_service`.
///
/// The catalog comes from `catalog_path` when configured, then from
/// `catalog.toml` in the config directory when present, and from the
/// built-in copy otherwise.
///
/// A missing API key is not an error here; it surfaces on the first
/// calibration instead.
pub fn bootstrap(config_service: &ConfigService) -> Result<MirrorApp> {
    let config = config_service.get_config()?;
    let output = ProcessAudioOutput::new(config.player.clone());
    assemble(config, Box::new(output))
}

/// Like [`bootstrap`], with audio going to `output` instead of the
/// configured player.
pub fn bootstrap_with_output(
    config_service: &ConfigService,
    output: Box<dyn AudioOutput>,
) -> Result<MirrorApp> {
    assemble(config_service.get_config()?, output)
}

fn assemble(config: MirrorConfig, output: Box<dyn AudioOutput>) -> Result<MirrorApp> {
    let catalog = Arc::new(load_catalog(&config)?);

    let secrets = Arc::new(EnvSecretService::new(config.api_key_env.clone()));
    let client = GeminiCalibrationClient::new(secrets)
        .with_model(config.model.clone())
        .with_base_url(config.base_url.clone())
        .with_system_instruction(build_system_instruction(&catalog));

    let playback = PlaybackCoordinator::new(output, config.ambient_url.clone());

    let usecase = CalibrationUseCase::new(
        Arc::new(client),
        catalog,
        config.history_capacity()?,
        playback,
    )
    .with_request_timeout(config.request_timeout());

    tracing::info!(model = %config.model, "Application ready");

    Ok(MirrorApp {
        config,
        usecase: Arc::new(usecase),
    })
}

fn load_catalog(config: &MirrorConfig) -> Result<CatalogIndex> {
    CatalogRepository::load(catalog_override(config).as_deref())
}

fn catalog_override(config: &MirrorConfig) -> Option<PathBuf> {
    if let Some(path) = &config.catalog_path {
        return Some(path.clone());
    }
    MirrorPaths::catalog_file().ok().filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_infrastructure::MutedAudioOutput;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_with_catalog_override() {
        let temp_dir = TempDir::new().unwrap();
        let catalog_path = temp_dir.path().join("catalog.toml");
        std::fs::write(
            &catalog_path,
            "version = 3\n\
             [[books]]\ntitle = \"《零极限》\"\nauthor = \"修·蓝博士\"\n\
             [[tracks]]\ntitle = \"Eternal Silence\"\nurl = \"https://example.com/9.mp3\"\n",
        )
        .unwrap();

        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "catalog_path = {:?}\nhistory_capacity = 3\n",
                catalog_path.display().to_string()
            ),
        )
        .unwrap();

        let app =
            bootstrap_with_output(&ConfigService::with_path(&config_path), Box::new(MutedAudioOutput))
                .unwrap();
        assert_eq!(app.config.history_capacity, 3);
        assert_eq!(app.usecase.catalog().version(), 3);
        assert_eq!(app.usecase.catalog().first_book().title, "《零极限》");
    }

    #[test]
    fn test_bootstrap_rejects_broken_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let catalog_path = temp_dir.path().join("catalog.toml");
        std::fs::write(&catalog_path, "version = 1\n").unwrap();

        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!("catalog_path = {:?}\n", catalog_path.display().to_string()),
        )
        .unwrap();

        let err = bootstrap(&ConfigService::with_path(&config_path)).err().unwrap();
        assert!(err.is_config());
    }
}
