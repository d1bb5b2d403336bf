use anyhow::{Context, Result};
use audition_core::AnalysisConfig;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = "audition.toml";

/// Loads the analysis config from `explicit`, else from `./audition.toml`
/// when it exists, else the built-in defaults. The result is validated.
pub fn load_config(explicit: Option<&Path>) -> Result<AnalysisConfig> {
    let path = explicit.map(Path::to_path_buf).or_else(|| {
        let local = PathBuf::from(LOCAL_CONFIG);
        local.exists().then_some(local)
    });

    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: AnalysisConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => AnalysisConfig::default(),
    };

    config.validate().context("Invalid analysis config")?;
    Ok(config)
}
