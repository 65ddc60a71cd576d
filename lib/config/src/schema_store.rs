use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where introspected schemas are kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "source")]
pub enum SchemaStoreConfig {
    /// Schemas live for the lifetime of the process only.
    #[serde(rename = "memory")]
    Memory,
    /// One SDL file per endpoint inside `directory`. A relative directory is
    /// resolved against the directory of the loaded configuration file.
    #[serde(rename = "file")]
    File {
        #[serde(default = "default_directory")]
        directory: PathBuf,
    },
}

fn default_directory() -> PathBuf {
    PathBuf::from(".graphql-mock/schemas")
}

impl Default for SchemaStoreConfig {
    fn default() -> Self {
        SchemaStoreConfig::File {
            directory: default_directory(),
        }
    }
}
