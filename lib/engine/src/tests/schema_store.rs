use crate::{
    schema_store::{Endpoint, FileSchemaStore, InMemorySchemaStore, SchemaStore},
    tests::testkit::init_logger,
};

const SDL: &str = "type Query { ping: String }";

#[test]
fn endpoint_identity_is_host_and_path() -> Result<(), url::ParseError> {
    let endpoint = Endpoint::parse("https://api.example.com:8443/graphql?op=1")?;

    assert_eq!(endpoint.host(), "api.example.com:8443");
    assert_eq!(endpoint.path(), "/graphql");
    assert_eq!(
        endpoint.to_string(),
        "https://api.example.com:8443/graphql?op=1"
    );

    Ok(())
}

#[tokio::test]
async fn in_memory_store_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let store = InMemorySchemaStore::new();
    let endpoint = Endpoint::parse("http://localhost:4000/graphql")?;
    let other_path = Endpoint::parse("http://localhost:4000/admin/graphql")?;

    assert_eq!(store.get(&endpoint).await?, None);

    store.put(&endpoint, SDL).await?;

    assert_eq!(store.get(&endpoint).await?.as_deref(), Some(SDL));
    assert_eq!(store.get(&other_path).await?, None);

    Ok(())
}

#[tokio::test]
async fn file_store_writes_one_file_per_endpoint() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let directory = tempfile::tempdir()?;
    let store = FileSchemaStore::new(directory.path().join("schemas"));
    let endpoint = Endpoint::parse("http://localhost:4000/graphql")?;
    let other_path = Endpoint::parse("http://localhost:4000/v2/graphql")?;

    assert_eq!(store.get(&endpoint).await?, None);

    store.put(&endpoint, SDL).await?;
    store.put(&other_path, "type Query { v2: Int }").await?;

    assert_eq!(store.get(&endpoint).await?.as_deref(), Some(SDL));
    assert_eq!(
        store.get(&other_path).await?.as_deref(),
        Some("type Query { v2: Int }")
    );

    let file_name = store
        .file_path(&endpoint)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or("missing file name")?;
    assert!(file_name.starts_with("localhost_4000-"));
    assert!(file_name.ends_with(".graphql"));
    assert_ne!(store.file_path(&endpoint), store.file_path(&other_path));

    Ok(())
}

#[tokio::test]
async fn file_store_replaces_schemas_without_leftovers() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let directory = tempfile::tempdir()?;
    let store = FileSchemaStore::new(directory.path());
    let endpoint = Endpoint::parse("https://api.example.com/graphql")?;

    store.put(&endpoint, SDL).await?;
    store.put(&endpoint, "type Query { replaced: Boolean }").await?;

    assert_eq!(
        store.get(&endpoint).await?.as_deref(),
        Some("type Query { replaced: Boolean }")
    );

    let entries: Vec<std::path::PathBuf> = std::fs::read_dir(directory.path())?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<_, _>>()?;
    assert_eq!(entries, vec![store.file_path(&endpoint)]);

    Ok(())
}
