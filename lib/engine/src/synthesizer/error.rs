use crate::data_set::DataSetError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Expected exactly one operation in the document, found {0}")]
    OperationCount(usize),
    #[error("Operation type \"{0}\" is not supported")]
    UnsupportedOperation(&'static str),
    #[error("Schema does not define a root type for {0} operations")]
    MissingRootType(&'static str),
    #[error("Unknown fragment \"{0}\"")]
    UnknownFragment(String),
    #[error("Fragment \"{0}\" spreads itself")]
    FragmentCycle(String),
    #[error("Selection at \"{path}\" does not select a concrete type of \"{abstract_type}\"")]
    UnresolvedAbstractType { path: String, abstract_type: String },
    #[error("Field \"{path}\" of type \"{type_name}\" must have a selection of subfields")]
    MissingSelectionSet { path: String, type_name: String },
    #[error("Enum \"{0}\" has no values")]
    EmptyEnum(String),
    #[error("Invalid data set: {0}")]
    InvalidDataSet(#[from] DataSetError),
}
