use crate::{Error, Result};
use docview_engine::{DocumentFilter, LayoutConfig, Theme};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolve the configuration file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. DOCVIEW_CONFIG environment variable (with tilde expansion)
/// 3. `<config dir>/docview/config.toml`
/// 4. `~/.config/docview/config.toml` (fallback when no config dir is known)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("DOCVIEW_CONFIG") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("docview").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".config/docview/config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME or config directory found".to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Geometry used until the client reports its window size.
    pub default_width: u16,
    pub default_height: u16,
    pub shutdown_grace_secs: u64,
    pub max_sessions: usize,
    /// Ed25519 host key, created on first start when missing.
    /// Defaults to `ssh_host_ed25519_key` next to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_key_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 23234,
            default_width: 80,
            default_height: 24,
            shutdown_grace_secs: 30,
            max_sessions: 64,
            host_key_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub extensions: Vec<String>,
    pub max_bytes: u64,
    pub read_timeout_ms: u64,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "markdown".to_string()],
            max_bytes: 1024 * 1024,
            read_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub sidebar_width: u16,
    pub max_content_width: u16,
    pub min_wrap_width: u16,
}

impl Default for LayoutSection {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            sidebar_width: layout.sidebar_width,
            max_content_width: layout.max_content_width,
            min_wrap_width: layout.min_wrap_width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSection {
    pub accent: String,
    pub muted: String,
    pub code: String,
}

impl Default for ThemeSection {
    fn default() -> Self {
        Self {
            accent: "#7D56F4".to_string(),
            muted: "240".to_string(),
            code: "#E5C07B".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    pub server: ServerConfig,
    pub documents: DocumentsConfig,
    pub layout: LayoutSection,
    pub theme: ThemeSection,
}

impl AppConfig {
    /// Load from the resolved config path; a missing file yields defaults.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let path = resolve_config_path(explicit_path)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Document root with tilde expansion applied.
    pub fn root_path(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) if !root.as_os_str().is_empty() => {
                Ok(expand_tilde(&root.to_string_lossy()))
            }
            _ => Err(Error::Config(
                "no document root configured (set `root` or pass --root)".to_string(),
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.root_path()?;

        if self.server.port == 0 {
            return Err(Error::Config("server.port must not be 0".to_string()));
        }
        if self.server.max_sessions == 0 {
            return Err(Error::Config(
                "server.max_sessions must be at least 1".to_string(),
            ));
        }
        if self.documents.read_timeout_ms == 0 {
            return Err(Error::Config(
                "documents.read_timeout_ms must not be 0".to_string(),
            ));
        }
        if self.layout.min_wrap_width == 0 {
            return Err(Error::Config(
                "layout.min_wrap_width must be at least 1".to_string(),
            ));
        }
        if self.layout.max_content_width < self.layout.min_wrap_width {
            return Err(Error::Config(format!(
                "layout.max_content_width ({}) is smaller than layout.min_wrap_width ({})",
                self.layout.max_content_width, self.layout.min_wrap_width
            )));
        }
        self.theme()?;
        Ok(())
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(Theme {
            accent: parse_color("theme.accent", &self.theme.accent)?,
            muted: parse_color("theme.muted", &self.theme.muted)?,
            code: parse_color("theme.code", &self.theme.code)?,
            ..Theme::default()
        })
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            sidebar_width: self.layout.sidebar_width,
            max_content_width: self.layout.max_content_width,
            min_wrap_width: self.layout.min_wrap_width,
        }
    }

    pub fn filter(&self) -> DocumentFilter {
        DocumentFilter::new(&self.documents.extensions)
    }

    /// Host key location with tilde expansion applied.
    pub fn host_key_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.server.host_key_path {
            return Ok(expand_tilde(&path.to_string_lossy()));
        }
        let config_path = resolve_config_path(None)?;
        let dir = config_path.parent().unwrap_or(Path::new("."));
        Ok(dir.join("ssh_host_ed25519_key"))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.documents.read_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_grace_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_color(key: &str, value: &str) -> Result<Color> {
    value
        .parse::<Color>()
        .map_err(|_| Error::Config(format!("{}: unknown color '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_root() -> AppConfig {
        AppConfig {
            root: Some(PathBuf::from("docs")),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.root, None);
        assert_eq!(config.server.port, 23234);
        assert_eq!(config.bind_addr(), "127.0.0.1:23234");
        assert_eq!(config.documents.extensions, vec!["md", "markdown"]);
        assert_eq!(config.layout(), LayoutConfig::default());
        assert_eq!(config.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested/config.toml");

        let mut config = with_root();
        config.server.port = 2300;
        config.documents.extensions = vec!["md".to_string(), "txt".to_string()];
        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = AppConfig::load_from(&config_path)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = AppConfig::load_from(&temp_dir.path().join("nonexistent.toml"))?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "root = 'notes'\n[server]\nport = 4000\n")?;

        let config = AppConfig::load_from(&config_path)?;
        assert_eq!(config.root, Some(PathBuf::from("notes")));
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.layout.sidebar_width, 28);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_config_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[server\nport = ")?;

        let err = AppConfig::load_from(&config_path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(with_root().validate().is_ok());
        assert!(AppConfig::default().validate().is_err());

        let mut config = with_root();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = with_root();
        config.layout.min_wrap_width = 0;
        assert!(config.validate().is_err());

        let mut config = with_root();
        config.server.max_sessions = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.max_sessions"));

        let mut config = with_root();
        config.documents.read_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("documents.read_timeout_ms"));

        let mut config = with_root();
        config.layout.max_content_width = 5;
        assert!(config.validate().is_err());

        let mut config = with_root();
        config.theme.accent = "not-a-color".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("theme.accent"));
    }

    #[test]
    fn test_theme_colors() -> Result<()> {
        let mut config = with_root();
        config.theme.code = "yellow".to_string();
        let theme = config.theme()?;
        assert_eq!(theme.accent, Color::Rgb(0x7D, 0x56, 0xF4));
        assert_eq!(theme.muted, Color::Indexed(240));
        assert_eq!(theme.code, Color::Yellow);
        Ok(())
    }

    #[test]
    fn test_resolve_explicit_path() -> Result<()> {
        let path = resolve_config_path(Some("/etc/docview.toml"))?;
        assert_eq!(path, PathBuf::from("/etc/docview.toml"));
        Ok(())
    }

    #[test]
    fn test_host_key_path_from_config() -> Result<()> {
        let mut config = with_root();
        config.server.host_key_path = Some(PathBuf::from("/srv/docview/host_key"));
        assert_eq!(config.host_key_path()?, PathBuf::from("/srv/docview/host_key"));
        Ok(())
    }

    #[test]
    fn test_host_key_path_parses_from_toml() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[server]\nhost_key_path = '/keys/docview'\n")?;

        let config = AppConfig::load_from(&config_path)?;
        assert_eq!(
            config.server.host_key_path,
            Some(PathBuf::from("/keys/docview"))
        );
        Ok(())
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("docs/notes"), PathBuf::from("docs/notes"));
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
