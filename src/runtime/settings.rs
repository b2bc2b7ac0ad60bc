use tracing::warn;

use crate::config;

/// Validate freshly loaded settings, falling back to defaults on any problem.
///
/// Config is optional; failures should not prevent the app from starting.
pub fn resolve_settings(
    loaded: Result<config::Settings, ::config::ConfigError>,
) -> config::Settings {
    match loaded {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                warn!("invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            warn!("failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
