use std::env;
use std::path::PathBuf;

use super::schema::Settings;

const APP_DIR: &str = "tunebox";
const ENV_PREFIX: &str = "TUNEBOX";
const CONFIG_PATH_VAR: &str = "TUNEBOX_CONFIG_PATH";

/// Non-empty value of an environment variable.
fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// `$<xdg_var>/tunebox`, or `$HOME/<home_fallback>/tunebox` when the XDG
/// variable is unset or empty.
fn xdg_app_dir(xdg_var: &str, home_fallback: &[&str]) -> Option<PathBuf> {
    let base = env_path(xdg_var).or_else(|| {
        env_path("HOME").map(|home| home_fallback.iter().fold(home, |p, part| p.join(part)))
    })?;
    Some(base.join(APP_DIR))
}

impl Settings {
    /// Layer struct defaults, the optional config file and `TUNEBOX__*`
    /// environment overrides, in that order.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("library.extensions")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings the player cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.playback.tick_interval_ms == 0 {
            return Err("playback.tick_interval_ms must be >= 1".to_string());
        }
        let has_extension = self
            .library
            .extensions
            .iter()
            .any(|e| !e.trim().trim_start_matches('.').is_empty());
        if !has_extension {
            return Err("library.extensions must name at least one extension".to_string());
        }
        if self.now_playing.identity.trim().is_empty() {
            return Err("now_playing.identity must not be empty".to_string());
        }
        Ok(())
    }

    /// The configured library directory, else the XDG data default.
    pub fn library_root(&self) -> Option<PathBuf> {
        self.library.root.clone().or_else(default_library_root)
    }
}

/// `TUNEBOX_CONFIG_PATH` when set, else the XDG config file.
pub fn resolve_config_path() -> Option<PathBuf> {
    env_path(CONFIG_PATH_VAR).or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/tunebox/config.toml` or `~/.config/tunebox/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_app_dir("XDG_CONFIG_HOME", &[".config"]).map(|d| d.join("config.toml"))
}

/// `$XDG_DATA_HOME/tunebox/library` or `~/.local/share/tunebox/library`.
pub fn default_library_root() -> Option<PathBuf> {
    xdg_app_dir("XDG_DATA_HOME", &[".local", "share"]).map(|d| d.join("library"))
}
