//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".gistglimpse/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub preview: Preview,
}

/// Settings for the GitHub gists API client.
///
/// Fields left unset by every layer resolve to built-in defaults through the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Api {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds; `0` disables the timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Api {
    const DEFAULT_BASE_URL: &'static str = "https://api.github.com";
    const DEFAULT_USER_AGENT: &'static str = concat!("gistglimpse/", env!("CARGO_PKG_VERSION"));
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(Self::DEFAULT_BASE_URL)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(Self::DEFAULT_USER_AGENT)
    }

    /// Request timeout, or `None` when configured as `0`.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs.unwrap_or(Self::DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResolverSettings {
    #[serde(default)]
    pub host: Option<String>,
}

impl ResolverSettings {
    pub fn host(&self) -> &str {
        self.host
            .as_deref()
            .unwrap_or(crate::app::resolve::DEFAULT_GIST_HOST)
    }
}

/// Unset fields fall back to built-in defaults in the accessors, so a layer without a
/// `[preview]` table leaves earlier layers untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Preview {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    share_base_url: Option<String>,
}

impl Preview {
    fn default_format() -> &'static str {
        "html"
    }

    fn default_share_base_url() -> &'static str {
        "https://gist.github.com"
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or_else(|| Self::default_format())
    }

    pub fn share_base_url(&self) -> &str {
        self.share_base_url
            .as_deref()
            .unwrap_or_else(|| Self::default_share_base_url())
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    api_base_url: Option<String>,
    format: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            api_base_url: env::var("GISTGLIMPSE_API_BASE_URL").ok(),
            format: env::var("GISTGLIMPSE_FORMAT").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(api_base_url: &str, format: &str) -> Self {
        Self {
            api_base_url: Some(api_base_url.to_owned()),
            format: Some(format.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            api: merge_api(self.api, other.api),
            resolver: merge_resolver(self.resolver, other.resolver),
            preview: merge_preview(self.preview, other.preview),
        }
    }
}

fn merge_api(mut base: Api, overlay: Api) -> Api {
    if let Some(value) = overlay.base_url {
        base.base_url = Some(value);
    }
    if let Some(value) = overlay.user_agent {
        base.user_agent = Some(value);
    }
    if let Some(value) = overlay.timeout_secs {
        base.timeout_secs = Some(value);
    }
    base
}

fn merge_resolver(mut base: ResolverSettings, overlay: ResolverSettings) -> ResolverSettings {
    if let Some(value) = overlay.host {
        base.host = Some(value);
    }
    base
}

fn merge_preview(mut base: Preview, overlay: Preview) -> Preview {
    if let Some(value) = overlay.format {
        base.format = Some(value);
    }
    if let Some(value) = overlay.share_base_url {
        base.share_base_url = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("gistglimpse/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(base_url) = env.api_base_url {
        config.api.base_url = Some(base_url);
    }
    if let Some(format) = env.format {
        config.preview.format = Some(format);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.api.base_url(), "https://api.github.com");
        assert!(config.api.user_agent().starts_with("gistglimpse/"));
        assert_eq!(config.resolver.host(), "gist.github.com");
        assert_eq!(config.preview.format(), "html");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[api]
base_url = "https://github.example.com/api/v3"
[preview]
share_base_url = "https://gist.example.com"
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".gistglimpse"))?;
        fs::create_dir_all(workspace_dir.join(".git"))?;
        fs::write(
            workspace_dir.join(".gistglimpse/config.toml"),
            r#"
[api]
timeout_secs = 5
[preview]
format = "json"
"#,
        )?;

        let global_path = Some(global);
        let workspace_path = Some(workspace_dir.join(".gistglimpse/config.toml"));

        let config =
            Config::load_with_layers(global_path, workspace_path, EnvOverrides::default())?;

        assert_eq!(config.api.base_url(), "https://github.example.com/api/v3");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.preview.format(), "json");
        assert_eq!(config.preview.share_base_url(), "https://gist.example.com");
        assert_eq!(Config::default().preview.format(), "html");
        assert_eq!(find_repo_root(&workspace_dir), Some(workspace_dir.clone()));

        Ok(())
    }

    #[test]
    fn workspace_can_restore_default_values() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[api]
base_url = "https://ghe.example/api/v3"
timeout_secs = 90
[resolver]
host = "gist.ghe.example"
"#,
        )?;
        let workspace = temp.path().join("workspace.toml");
        fs::write(
            &workspace,
            r#"
[api]
base_url = "https://api.github.com"
timeout_secs = 30
[resolver]
host = "gist.github.com"
"#,
        )?;

        let config =
            Config::load_with_layers(Some(global), Some(workspace), EnvOverrides::default())?;

        assert_eq!(config.api.base_url(), "https://api.github.com");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.resolver.host(), "gist.github.com");
        Ok(())
    }

    #[test]
    fn layer_without_section_keeps_earlier_values() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(&global, "[resolver]\nhost = \"gist.ghe.example\"\n")?;
        let workspace = temp.path().join("workspace.toml");
        fs::write(&workspace, "[preview]\nformat = \"summary\"\n")?;

        let config =
            Config::load_with_layers(Some(global), Some(workspace), EnvOverrides::default())?;

        assert_eq!(config.resolver.host(), "gist.ghe.example");
        assert_eq!(config.preview.format(), "summary");
        Ok(())
    }

    #[test]
    fn zero_timeout_disables_the_timeout() -> Result<()> {
        let config = Config::from_str("[api]\ntimeout_secs = 0\n")?;
        assert_eq!(config.api.timeout(), None);
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("http://127.0.0.1:9999", "summary");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.api.base_url(), "http://127.0.0.1:9999");
        assert_eq!(config.preview.format(), "summary");
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
