use std::time::Duration;

use serde_json::json;

use crate::{
    fetcher::{FetchError, HttpSchemaFetcher, SchemaFetcher},
    schema_store::Endpoint,
    tests::testkit::init_logger,
};

#[tokio::test]
async fn returns_introspection_data() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Regex("IntrospectionQuery".to_string()))
        .with_status(200)
        .with_body(r#"{"data":{"__schema":{"queryType":{"name":"Query"}}}}"#)
        .create_async()
        .await;

    let fetcher = HttpSchemaFetcher::try_new(Duration::from_secs(5), 0)?;
    let endpoint = Endpoint::parse(&format!("{}/graphql", server.url()))?;
    let data = fetcher.fetch_introspection(&endpoint).await?;

    assert_eq!(data, json!({ "__schema": { "queryType": { "name": "Query" } } }));
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn graphql_errors_fail_the_fetch() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(r#"{"errors":[{"message":"introspection is disabled"}]}"#)
        .create_async()
        .await;

    let fetcher = HttpSchemaFetcher::try_new(Duration::from_secs(5), 0)?;
    let endpoint = Endpoint::parse(&format!("{}/graphql", server.url()))?;
    let result = fetcher.fetch_introspection(&endpoint).await;

    assert!(matches!(
        result,
        Err(FetchError::IntrospectionErrors(message)) if message.contains("introspection is disabled")
    ));

    Ok(())
}

#[tokio::test]
async fn http_status_errors_fail_the_fetch() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/graphql")
        .with_status(404)
        .create_async()
        .await;

    let fetcher = HttpSchemaFetcher::try_new(Duration::from_secs(5), 0)?;
    let endpoint = Endpoint::parse(&format!("{}/graphql", server.url()))?;
    let result = fetcher.fetch_introspection(&endpoint).await;

    assert!(matches!(result, Err(FetchError::NetworkResponse(_))));

    Ok(())
}

#[tokio::test]
async fn invalid_json_fails_the_fetch() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body("<html>not graphql</html>")
        .create_async()
        .await;

    let fetcher = HttpSchemaFetcher::try_new(Duration::from_secs(5), 0)?;
    let endpoint = Endpoint::parse(&format!("{}/graphql", server.url()))?;
    let result = fetcher.fetch_introspection(&endpoint).await;

    assert!(matches!(result, Err(FetchError::InvalidJson(_))));

    Ok(())
}
