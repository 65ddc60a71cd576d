mod env_overrides;
pub mod introspection;
pub mod log;
pub mod schema_store;

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use graphql_mock_engine::DataSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use crate::env_overrides::{EnvVarOverrides, EnvVarOverridesError};
use crate::{introspection::IntrospectionConfig, log::LoggingConfig, schema_store::SchemaStoreConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfig {
    #[serde(skip)]
    root_directory: PathBuf,

    #[serde(default)]
    pub log: LoggingConfig,

    /// Defaults for generated leaf values. Command line flags take precedence.
    #[serde(default)]
    pub data_set: DataSet,

    /// Storage for schemas obtained by introspection. Defaults to a file store
    /// under `.graphql-mock/schemas`.
    #[serde(default)]
    pub schema_store: SchemaStoreConfig,

    #[serde(default)]
    pub introspection: IntrospectionConfig,
}

impl MockConfig {
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Directory of the file schema store, resolved against the configuration
    /// root. `None` for the in-memory store.
    pub fn schema_store_directory(&self) -> Option<PathBuf> {
        match &self.schema_store {
            SchemaStoreConfig::Memory => None,
            SchemaStoreConfig::File { directory } => Some(self.root_directory.join(directory)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MockConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to get the current directory: {0}")]
    CurrentDirError(std::io::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "mock.config.yaml",
    "mock.config.yml",
    "mock.config.json",
    "mock.config.json5",
];

fn current_dir() -> Result<PathBuf, MockConfigError> {
    std::env::current_dir().map_err(MockConfigError::CurrentDirError)
}

/// Loads the configuration from `override_config_path`, or from the first
/// `mock.config.*` file found in the working directory, then applies the
/// environment overrides. Missing default files yield the defaults.
pub fn load_config(override_config_path: Option<String>) -> Result<MockConfig, MockConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut builder = Config::builder();
    let mut root_directory = current_dir()?;

    if let Some(path_str) = override_config_path {
        let path = path_str
            .parse::<PathBuf>()
            .map_err(MockConfigError::ConfigPathParseError)?;
        if let Some(parent) = path.parent() {
            root_directory = root_directory.join(parent);
        }
        debug!(path = %path.display(), "loading configuration file");
        let file: File<FileSourceFile, _> = path.into();
        builder = builder.add_source(file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    builder = env_overrides.apply_overrides(builder)?;

    let mut config = builder.build()?.try_deserialize::<MockConfig>()?;
    config.root_directory = root_directory;

    Ok(config)
}

pub fn parse_yaml_config(config_raw: &str) -> Result<MockConfig, MockConfigError> {
    let mut config = Config::builder()
        .add_source(File::from_str(config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<MockConfig>()?;
    config.root_directory = current_dir()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use config::{Config, File, FileFormat};
    use graphql_mock_engine::data_set::BooleanValues;
    use pretty_assertions::assert_eq;

    use crate::{
        log::{LogFormat, LogLevel},
        parse_yaml_config,
        schema_store::SchemaStoreConfig,
        EnvVarOverrides, MockConfig,
    };

    #[test]
    fn empty_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let config = parse_yaml_config("")?;

        assert_eq!(config.data_set, Default::default());
        assert_eq!(config.schema_store, SchemaStoreConfig::default());
        assert_eq!(config.introspection.timeout, Duration::from_secs(10));
        assert_eq!(config.introspection.retry_count, 3);
        assert!(config.log.filter.is_none());
        assert_eq!(
            config.schema_store_directory(),
            Some(config.root_directory().join(".graphql-mock/schemas"))
        );

        Ok(())
    }

    #[test]
    fn full_config() -> Result<(), Box<dyn std::error::Error>> {
        let config = parse_yaml_config(
            r#"
log:
  level: warn
  format: pretty-tree
  filter: graphql_mock_engine=trace
data_set:
  string_length: 3
  array_length: 1
  is_special_allowed: false
  boolean_values: "true"
  num_range_start: -5
  num_range_end: 5
  digits_after_decimal: 0
schema_store:
  source: memory
introspection:
  timeout: 1m 30s
  retry_count: 0
"#,
        )?;

        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.log.format, LogFormat::PrettyTree);
        assert_eq!(config.log.env_filter_str(), "graphql_mock_engine=trace");
        assert_eq!(config.data_set.string_length, 3);
        assert_eq!(config.data_set.array_length, 1);
        assert!(!config.data_set.is_special_allowed);
        assert_eq!(config.data_set.boolean_values, BooleanValues::AlwaysTrue);
        assert_eq!(config.data_set.num_range_start, -5);
        assert_eq!(config.data_set.num_range_end, 5);
        assert_eq!(config.data_set.digits_after_decimal, 0);
        assert_eq!(config.schema_store, SchemaStoreConfig::Memory);
        assert_eq!(config.schema_store_directory(), None);
        assert_eq!(config.introspection.timeout, Duration::from_secs(90));
        assert_eq!(config.introspection.retry_count, 0);

        Ok(())
    }

    #[test]
    fn partial_data_set_keeps_remaining_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let config = parse_yaml_config(
            r#"
data_set:
  array_length: 2
"#,
        )?;

        assert_eq!(config.data_set.array_length, 2);
        assert_eq!(config.data_set.string_length, 8);
        assert_eq!(config.data_set.num_range_end, 1000);

        Ok(())
    }

    #[test]
    fn file_store_directory_is_resolved_against_root() -> Result<(), Box<dyn std::error::Error>> {
        let config = parse_yaml_config(
            r#"
schema_store:
  source: file
  directory: cache/schemas
"#,
        )?;

        assert_eq!(
            config.schema_store_directory(),
            Some(config.root_directory().join("cache/schemas"))
        );

        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_yaml_config("logging:\n  level: info\n").is_err());
        assert!(parse_yaml_config("schema_store:\n  source: redis\n").is_err());
    }

    #[test]
    fn env_overrides_win_over_file() -> Result<(), Box<dyn std::error::Error>> {
        let overrides = EnvVarOverrides {
            log_level: Some(LogLevel::Error),
            log_format: Some(LogFormat::Json),
            log_filter: None,
            schema_store_directory: Some("/tmp/schemas".to_string()),
        };
        let builder = Config::builder().add_source(File::from_str(
            "log:\n  level: trace\nschema_store:\n  source: memory\n",
            FileFormat::Yaml,
        ));
        let config = overrides
            .apply_overrides(builder)?
            .build()?
            .try_deserialize::<MockConfig>()?;

        assert_eq!(config.log.level, LogLevel::Error);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(
            config.schema_store,
            SchemaStoreConfig::File {
                directory: "/tmp/schemas".into()
            }
        );

        Ok(())
    }

    #[test]
    fn log_enums_parse_case_insensitively() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Pretty-Tree".parse::<LogFormat>(), Ok(LogFormat::PrettyTree));
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
