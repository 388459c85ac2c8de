use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tool: ToolConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    /// Settings document handed to the external tool. Written verbatim as JSON to
    /// `paths.run_config` before every run; its schema belongs to the tool.
    #[serde(default)]
    pub run_config: toml::Table,

    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "ripkit_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Where the external tool lives and where to get it from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Path of the tool executable inside the installation directory.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Installation directory. Falls back to the executable's parent directory.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,

    /// Zip archive to fetch when the installation is missing. `http(s)://` and `file://`.
    #[serde(default)]
    pub archive_url: Option<String>,

    /// Directory holding the temporary download. Falls back to the install dir's parent.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

fn default_archive_name() -> String {
    "tool".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: None,
            install_dir: None,
            archive_url: None,
            work_dir: None,
            archive_name: default_archive_name(),
        }
    }
}

impl ToolConfig {
    pub fn resolved_install_dir(&self) -> Option<PathBuf> {
        self.install_dir.clone().or_else(|| {
            self.executable
                .as_ref()
                .and_then(|exe| exe.parent())
                .map(|p| p.to_path_buf())
        })
    }

    pub fn resolved_work_dir(&self) -> Option<PathBuf> {
        self.work_dir.clone().or_else(|| {
            self.resolved_install_dir().map(|dir| {
                dir.parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."))
            })
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory the tool extracts assets from.
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Directory the tool writes into. Wiped before every run.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Where the run configuration is written for the tool to read.
    #[serde(default)]
    pub run_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Case-insensitive substring marking one unit of exported work in the tool's stdout.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Rough number of marker lines a full run produces. Only a heuristic.
    #[serde(default = "default_estimated_total_units")]
    pub estimated_total_units: u32,

    /// Bytes of stderr kept for diagnostics. Also caps one stdout line (at least 4 KiB).
    #[serde(default = "default_capture_bytes")]
    pub capture_bytes: usize,

    #[serde(default = "default_line_channel_capacity")]
    pub line_channel_capacity: usize,
}

fn default_marker() -> String {
    "Exporting".to_string()
}

fn default_estimated_total_units() -> u32 {
    5624
}

fn default_capture_bytes() -> usize {
    64 * 1024
}

fn default_line_channel_capacity() -> usize {
    1024
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            estimated_total_units: default_estimated_total_units(),
            capture_bytes: default_capture_bytes(),
            line_channel_capacity: default_line_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Resume position written when a step asks for a host restart.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.supervisor.marker, "Exporting");
        assert_eq!(cfg.supervisor.estimated_total_units, 5624);
        assert_eq!(cfg.tool.archive_name, "tool");
        assert!(cfg.paths.output.is_none());
        assert!(cfg.run_config.is_empty());
    }

    #[test]
    fn install_dir_falls_back_to_executable_parent() {
        let tool = ToolConfig {
            executable: Some(PathBuf::from("/opt/tools/ripper/ripper.exe")),
            ..Default::default()
        };
        assert_eq!(
            tool.resolved_install_dir(),
            Some(PathBuf::from("/opt/tools/ripper"))
        );
        assert_eq!(tool.resolved_work_dir(), Some(PathBuf::from("/opt/tools")));
    }

    #[test]
    fn run_config_table_is_kept_opaque() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [run_config]
            ScriptExportMode = "Decompiled"
            [run_config.Nested]
            Depth = 3
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.run_config["ScriptExportMode"].as_str(),
            Some("Decompiled")
        );
        assert_eq!(cfg.run_config["Nested"]["Depth"].as_integer(), Some(3));
    }
}
