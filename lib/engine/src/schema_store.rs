use std::{
    fmt::{self, Display},
    io::ErrorKind,
    path::{Path, PathBuf},
    process,
    str::FromStr,
};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tracing::{debug, trace};
use url::Url;
use xxhash_rust::xxh3::xxh3_64;

/// A GraphQL endpoint, identified in the store by its host (with port) and path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(input)?,
        })
    }

    pub fn host(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl FromStr for Endpoint {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::parse(s)
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaStoreError {
    #[error("Failed to access schema store: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured schemas, one SDL document per endpoint.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    async fn get(&self, endpoint: &Endpoint) -> Result<Option<String>, SchemaStoreError>;
    async fn put(&self, endpoint: &Endpoint, sdl: &str) -> Result<(), SchemaStoreError>;
}

#[derive(Debug, Default)]
pub struct InMemorySchemaStore {
    schemas: DashMap<(String, String), String>,
}

impl InMemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn get(&self, endpoint: &Endpoint) -> Result<Option<String>, SchemaStoreError> {
        let key = (endpoint.host(), endpoint.path().to_string());

        Ok(self.schemas.get(&key).map(|sdl| sdl.value().clone()))
    }

    async fn put(&self, endpoint: &Endpoint, sdl: &str) -> Result<(), SchemaStoreError> {
        let key = (endpoint.host(), endpoint.path().to_string());
        self.schemas.insert(key, sdl.to_string());

        Ok(())
    }
}

/// Stores each schema as `<host>-<xxh3 of path>.graphql` inside `directory`.
/// Writes go to a sibling staging file that is renamed over the target.
#[derive(Debug, Clone)]
pub struct FileSchemaStore {
    directory: PathBuf,
}

impl FileSchemaStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_path(&self, endpoint: &Endpoint) -> PathBuf {
        let host: String = endpoint
            .host()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let path_hash = xxh3_64(endpoint.path().as_bytes());

        self.directory
            .join(format!("{host}-{path_hash:016x}.graphql"))
    }
}

#[async_trait]
impl SchemaStore for FileSchemaStore {
    async fn get(&self, endpoint: &Endpoint) -> Result<Option<String>, SchemaStoreError> {
        let file_path = self.file_path(endpoint);
        trace!(file_path = %file_path.display(), "reading schema from file store");

        match fs::read_to_string(&file_path).await {
            Ok(sdl) => Ok(Some(sdl)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, endpoint: &Endpoint, sdl: &str) -> Result<(), SchemaStoreError> {
        let file_path = self.file_path(endpoint);
        let staging_path = file_path.with_extension(format!("graphql.{}.tmp", process::id()));
        fs::create_dir_all(&self.directory).await?;
        fs::write(&staging_path, sdl).await?;
        if let Err(err) = fs::rename(&staging_path, &file_path).await {
            let _ = fs::remove_file(&staging_path).await;
            return Err(err.into());
        }

        debug!(
            endpoint = %endpoint,
            file_path = %file_path.display(),
            "schema stored"
        );

        Ok(())
    }
}
