use graphql_parser::{
    parse_query, parse_schema as parse_schema_document, query::Document as QueryDocument,
    schema::Document,
};

pub use graphql_parser::{
    query::ParseError as OperationParseError, schema::ParseError as SchemaParseError,
};

pub type SchemaDocument = Document<'static, String>;
pub type OperationDocument = QueryDocument<'static, String>;

pub fn parse_schema(sdl: &str) -> Result<SchemaDocument, SchemaParseError> {
    Ok(parse_schema_document::<String>(sdl)?.into_static())
}

pub fn parse_operation(text: &str) -> Result<OperationDocument, OperationParseError> {
    Ok(parse_query::<String>(text)?.into_static())
}
