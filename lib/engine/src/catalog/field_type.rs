use std::collections::HashMap;

use graphql_parser::schema::Type;

use crate::catalog::error::SchemaMalformedError;

pub const BUILTIN_SCALARS: [&str; 5] = ["Boolean", "Float", "ID", "Int", "String"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Boolean,
    ID,
    Custom(String),
}

impl ScalarKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Int" => ScalarKind::Int,
            "Float" => ScalarKind::Float,
            "String" => ScalarKind::String,
            "Boolean" => ScalarKind::Boolean,
            "ID" => ScalarKind::ID,
            other => ScalarKind::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::ID => "ID",
            ScalarKind::Custom(name) => name,
        }
    }
}

/// The shape of a field's declared type, one variant per kind of named type plus
/// `List` for each list wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputType {
    Scalar(ScalarKind),
    Enum(String),
    Object(String),
    Interface(String),
    Union(String),
    List(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub of_type: OutputType,
    pub non_null: bool,
}

impl FieldType {
    pub fn base_type_name(&self) -> &str {
        match &self.of_type {
            OutputType::List(item_type) => item_type.base_type_name(),
            OutputType::Scalar(kind) => kind.name(),
            OutputType::Enum(name)
            | OutputType::Object(name)
            | OutputType::Interface(name)
            | OutputType::Union(name) => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.of_type, OutputType::List(_))
    }

    pub fn is_non_null(&self) -> bool {
        self.non_null
    }

    pub fn is_list_item_non_null(&self) -> bool {
        match &self.of_type {
            OutputType::List(item_type) => item_type.non_null,
            _ => false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        match &self.of_type {
            OutputType::List(item_type) => item_type.is_leaf(),
            OutputType::Scalar(_) | OutputType::Enum(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

/// Unwraps non-null and list wrappers outside-in, resolving the terminal name
/// against the kinds declared by the schema.
pub(crate) fn resolve_field_type(
    ast: &Type<'static, String>,
    kinds: &HashMap<String, TypeKind>,
    owner: &str,
    field: &str,
) -> Result<FieldType, SchemaMalformedError> {
    match ast {
        Type::NonNullType(inner) => {
            let mut field_type = resolve_field_type(inner, kinds, owner, field)?;
            field_type.non_null = true;
            Ok(field_type)
        }
        Type::ListType(item) => Ok(FieldType {
            of_type: OutputType::List(Box::new(resolve_field_type(item, kinds, owner, field)?)),
            non_null: false,
        }),
        Type::NamedType(name) => {
            let of_type = match kinds.get(name) {
                Some(TypeKind::Scalar) => OutputType::Scalar(ScalarKind::from_name(name)),
                Some(TypeKind::Enum) => OutputType::Enum(name.clone()),
                Some(TypeKind::Object) => OutputType::Object(name.clone()),
                Some(TypeKind::Interface) => OutputType::Interface(name.clone()),
                Some(TypeKind::Union) => OutputType::Union(name.clone()),
                Some(TypeKind::InputObject) => {
                    return Err(SchemaMalformedError::InputTypeInOutputPosition {
                        owner: owner.to_string(),
                        field: field.to_string(),
                        type_name: name.clone(),
                    })
                }
                None => {
                    return Err(SchemaMalformedError::UnknownFieldType {
                        owner: owner.to_string(),
                        field: field.to_string(),
                        type_name: name.clone(),
                    })
                }
            };

            Ok(FieldType {
                of_type,
                non_null: false,
            })
        }
    }
}
