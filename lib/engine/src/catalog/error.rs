#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaMalformedError {
    #[error("Failed to parse schema: {0}")]
    Parse(String),
    #[error("Type \"{0}\" is defined more than once")]
    DuplicateType(String),
    #[error("Field \"{owner}.{field}\" is defined more than once")]
    DuplicateField { owner: String, field: String },
    #[error("Field \"{owner}.{field}\" references unknown type \"{type_name}\"")]
    UnknownFieldType {
        owner: String,
        field: String,
        type_name: String,
    },
    #[error("Field \"{owner}.{field}\" uses input type \"{type_name}\" as its output type")]
    InputTypeInOutputPosition {
        owner: String,
        field: String,
        type_name: String,
    },
    #[error("Enum \"{0}\" declares no values")]
    EmptyEnum(String),
    #[error("Union \"{union_name}\" lists \"{member}\", which is not an object type")]
    InvalidUnionMember { union_name: String, member: String },
    #[error("Type \"{type_name}\" implements \"{interface}\", which is not an interface")]
    InvalidInterface { type_name: String, interface: String },
    #[error("Extension of \"{0}\" does not match a declared type of the same kind")]
    UnknownExtensionTarget(String),
    #[error("Root operation type \"{0}\" is not a declared object type")]
    InvalidRootType(String),
    #[error("Schema does not declare a query root type")]
    MissingQueryType,
}
