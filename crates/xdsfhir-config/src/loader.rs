use std::path::{Path, PathBuf};

use config::{Config, Environment, File};

use crate::{AppConfig, ConfigError};

pub const DEFAULT_CONFIG_FILE: &str = "xdsfhir.toml";
pub const ENV_PREFIX: &str = "XDSFHIR";

/// Loads `path` (or `xdsfhir.toml` when present) and applies `XDSFHIR__*`
/// environment overrides, then validates the result.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with_prefix(path, ENV_PREFIX)
}

pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    let file = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::Invalid(format!(
                    "config file {} does not exist",
                    p.display()
                )));
            }
            Some(p.to_path_buf())
        }
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };
    if let Some(file) = file {
        tracing::debug!(path = %file.display(), "Loading configuration file");
        builder = builder.add_source(File::from(file));
    }
    // Environment variable overrides, e.g. XDSFHIR__QUERY__MAX_RESULTS=50
    builder = builder.add_source(
        Environment::with_prefix(prefix)
            .try_parsing(true)
            .separator("__"),
    );

    let cfg: AppConfig = builder.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"
[query]
max_results = 25

[backend]
base_url = "http://fhir.example.org/r4"

[repository]
unknown_repository_id = "1.1.1"

[repository.endpoints]
"1.2.3.4" = "http://repo.example.org/docs/$documentUniqueId"
"#,
        );
        let cfg = load_with_prefix(Some(file.path()), "XDSFHIR_TEST_FILE").unwrap();

        assert_eq!(cfg.query.max_results, 25);
        assert_eq!(cfg.backend.base_url, "http://fhir.example.org/r4");
        assert_eq!(cfg.backend.timeout_ms, 30_000);
        assert_eq!(cfg.repository.unknown_repository_id, "1.1.1");
        assert_eq!(
            cfg.repository.endpoints.get("1.2.3.4").map(String::as_str),
            Some("http://repo.example.org/docs/$documentUniqueId")
        );
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("[query]\nmax_results = 25\n");
        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("XDSFHIR_TEST_ENV__QUERY__MAX_RESULTS", "50");
        }
        let cfg = load_with_prefix(Some(file.path()), "XDSFHIR_TEST_ENV").unwrap();
        unsafe {
            std::env::remove_var("XDSFHIR_TEST_ENV__QUERY__MAX_RESULTS");
        }

        assert_eq!(cfg.query.max_results, 50);
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let file = write_config("[logging]\nlevel = \"loud\"\n");
        let err = load_with_prefix(Some(file.path()), "XDSFHIR_TEST_INVALID").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_explicit_file_rejected() {
        let err = load_with_prefix(Some(Path::new("/nonexistent/xdsfhir.toml")), "XDSFHIR_TEST_MISSING")
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
