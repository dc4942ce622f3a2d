use anyhow::Result;
use mirror_infrastructure::ConfigService;

pub fn show(config_service: &ConfigService) -> Result<()> {
    let config = config_service.get_config()?;
    let path = config_service.path();

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, showing defaults)", path.display());
    }

    let key_state = match std::env::var(&config.api_key_env) {
        Ok(value) if !value.trim().is_empty() => "set",
        _ => "missing",
    };
    println!("# API key ({}): {}\n", config.api_key_env, key_state);

    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
