use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default ripkit data directory: ~/.ripkit
pub fn get_ripkit_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".ripkit"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let mut cfg = toml::from_str::<AppConfig>(&s)?;
    apply_defaults_and_env(&mut cfg)?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.ripkit/config.toml (highest)
    let ripkit_dir = get_ripkit_data_dir()?;
    let home_config = ripkit_dir.join("config.toml");

    // Priority 2: ./ripkit.toml (current directory)
    let local_config = Path::new("ripkit.toml");

    let mut cfg: AppConfig = if home_config.exists() {
        let s = std::fs::read_to_string(&home_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    apply_defaults_and_env(&mut cfg)?;
    Ok(cfg)
}

fn apply_defaults_and_env(cfg: &mut AppConfig) -> anyhow::Result<()> {
    let ripkit_dir = get_ripkit_data_dir()?;

    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(ripkit_dir.join("logs").to_string_lossy().to_string());
    }

    if cfg.pipeline.state_file.is_none() {
        cfg.pipeline.state_file = Some(ripkit_dir.join("pipeline.state.json"));
    }

    apply_env_overrides(cfg, |key| std::env::var(key).ok());
    Ok(())
}

/// Environment variable overrides (Priority 0: highest, below CLI flags).
fn apply_env_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("RIPKIT_TOOL_EXE") {
        cfg.tool.executable = Some(PathBuf::from(v));
    }
    if let Some(v) = get("RIPKIT_ARCHIVE_URL") {
        cfg.tool.archive_url = Some(v);
    }
    if let Some(v) = get("RIPKIT_INPUT") {
        cfg.paths.input = Some(PathBuf::from(v));
    }
    if let Some(v) = get("RIPKIT_OUTPUT") {
        cfg.paths.output = Some(PathBuf::from(v));
    }
    if let Some(v) = get("RIPKIT_RUN_CONFIG") {
        cfg.paths.run_config = Some(PathBuf::from(v));
    }
}
