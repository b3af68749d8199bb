use std::env;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `PORT`
    pub port: u16,
    /// `APP_DATA_PATH`: file backing the local key-value store.
    pub data_path: PathBuf,
    /// `APP_ASSETS_DIR`: where `images/...` references are resolved.
    pub assets_dir: PathBuf,
    /// `APP_TEMPLATE_PATH`: optional replacement for the built-in page.
    pub template_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from("data/local_storage.json"),
            assets_dir: PathBuf::from("images"),
            template_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().unwrap_or_else(|_| {
                warn!("ignoring invalid PORT {value:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            port,
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            assets_dir: lookup("APP_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            template_path: lookup("APP_TEMPLATE_PATH")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9001"),
            ("APP_DATA_PATH", "/tmp/board.json"),
            ("APP_ASSETS_DIR", "/srv/faces"),
            ("APP_TEMPLATE_PATH", "page.html"),
        ]);
        assert_eq!(config.port, 9001);
        assert_eq!(config.data_path, PathBuf::from("/tmp/board.json"));
        assert_eq!(config.assets_dir, PathBuf::from("/srv/faces"));
        assert_eq!(config.template_path, Some(PathBuf::from("page.html")));
    }

    #[test]
    fn bad_port_falls_back() {
        let config = config_from(&[("PORT", "eighty"), ("APP_TEMPLATE_PATH", " ")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.template_path, None);
    }
}
