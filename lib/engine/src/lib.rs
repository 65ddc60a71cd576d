pub mod catalog;
pub mod data_set;
pub mod fetcher;
pub mod introspection;
pub mod mocker;
pub mod parsing;
pub mod schema_store;
pub mod synthesizer;
pub mod validator;

#[cfg(test)]
mod tests;

pub use catalog::{OperationKind, SchemaMalformedError, TypeCatalog};
pub use data_set::DataSet;
pub use synthesizer::{synthesize, GenerationError, SynthesisOutcome};
pub use validator::{validate, ValidationReport};

pub const TYPENAME_FIELD: &str = "__typename";
