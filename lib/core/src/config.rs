use std::path::PathBuf;

/// Common configuration shared by service binaries.
///
/// Parsed from command-line arguments, then passed to storage layer
/// initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the server's data files.
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database file.
    /// Defaults to `{data_dir}/data.sqlite` if not specified.
    pub sqlite_path: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            sqlite_path: None,
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Parse configuration from command-line arguments.
    ///
    /// Supported flags:
    /// - `--data-dir=PATH`
    /// - `--sqlite=PATH`
    /// - `--listen=ADDR`
    pub fn from_args(args: &[String]) -> Self {
        let mut config = ServiceConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--data-dir=") {
                config.data_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--sqlite=") {
                config.sqlite_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--listen=") {
                config.listen = val.to_string();
            }
        }

        config
    }

    /// Resolve the SQLite database path, falling back to `{data_dir}/data.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.sqlite"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args() {
        let args = vec![
            "--data-dir=/tmp/erp".to_string(),
            "--listen=127.0.0.1:9090".to_string(),
        ];
        let config = ServiceConfig::from_args(&args);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/erp")));
        assert_eq!(config.listen, "127.0.0.1:9090");
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/data/data.sqlite")
        );
    }
}
