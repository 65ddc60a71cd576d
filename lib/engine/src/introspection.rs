use graphql_parser::{
    schema::{
        Definition, Directive, Document, EnumType, EnumValue, Field, InputObjectType, InputValue,
        InterfaceType, ObjectType, ScalarType, SchemaDefinition, Type, TypeDefinition, UnionType,
        Value,
    },
    Pos,
};
use graphql_tools::introspection::{
    IntrospectionEnumValue, IntrospectionField, IntrospectionInputTypeRef,
    IntrospectionInputValue, IntrospectionOutputTypeRef, IntrospectionQuery, IntrospectionSchema,
    IntrospectionType,
};
use tracing::{debug, instrument};

use crate::{catalog::BUILTIN_SCALARS, parsing::SchemaDocument};

/// Introspection query sent to an endpoint whose schema is not cached yet.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}"#;

const DEPRECATED_DIRECTIVE: &str = "deprecated";

#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError {
    #[error("Failed to deserialize introspection result: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("Introspection type reference of \"{0}\" is missing its wrapped type")]
    IncompleteTypeRef(String),
}

/// Prints the schema described by an introspection result as SDL.
///
/// Accepts either the `data` member of the response or the whole response.
/// Built-in scalars and `__` types are left out, as are argument default values.
#[instrument(level = "trace", skip_all)]
pub fn sdl_from_introspection(result: &serde_json::Value) -> Result<String, IntrospectionError> {
    let data = result.get("data").unwrap_or(result);
    let introspection: IntrospectionQuery = serde_json::from_value(data.clone())?;
    let document = document_from_introspection(&introspection.__schema)?;

    debug!(
        definitions = document.definitions.len(),
        "converted introspection result to sdl"
    );

    Ok(document.to_string())
}

pub fn document_from_introspection(
    schema: &IntrospectionSchema,
) -> Result<SchemaDocument, IntrospectionError> {
    let mut definitions = vec![Definition::SchemaDefinition(SchemaDefinition {
        position: Pos::default(),
        directives: vec![],
        query: Some(schema.query_type.name.clone()),
        mutation: schema.mutation_type.as_ref().map(|t| t.name.clone()),
        subscription: schema.subscription_type.as_ref().map(|t| t.name.clone()),
    })];

    for introspection_type in &schema.types {
        if let Some(type_definition) = type_definition_from_introspection(introspection_type)? {
            definitions.push(Definition::TypeDefinition(type_definition));
        }
    }

    Ok(Document { definitions })
}

fn type_definition_from_introspection(
    introspection_type: &IntrospectionType,
) -> Result<Option<TypeDefinition<'static, String>>, IntrospectionError> {
    let type_definition = match introspection_type {
        IntrospectionType::SCALAR(scalar_type) => {
            if BUILTIN_SCALARS.contains(&scalar_type.name.as_str()) {
                return Ok(None);
            }
            let mut definition = ScalarType::new(scalar_type.name.clone());
            definition.description = scalar_type.description.clone();
            TypeDefinition::Scalar(definition)
        }
        IntrospectionType::OBJECT(object_type) => {
            let mut definition = ObjectType::new(object_type.name.clone());
            definition.description = object_type.description.clone();
            definition.implements_interfaces = object_type
                .interfaces
                .iter()
                .map(|interface| interface.name.clone())
                .collect();
            definition.fields = fields_from_introspection(&object_type.fields)?;
            TypeDefinition::Object(definition)
        }
        IntrospectionType::INTERFACE(interface_type) => {
            let mut definition = InterfaceType::new(interface_type.name.clone());
            definition.description = interface_type.description.clone();
            definition.implements_interfaces = interface_type
                .interfaces
                .iter()
                .flatten()
                .map(|interface| interface.name.clone())
                .collect();
            definition.fields = fields_from_introspection(&interface_type.fields)?;
            TypeDefinition::Interface(definition)
        }
        IntrospectionType::UNION(union_type) => {
            let mut definition = UnionType::new(union_type.name.clone());
            definition.description = union_type.description.clone();
            definition.types = union_type
                .possible_types
                .iter()
                .map(|member| member.name.clone())
                .collect();
            TypeDefinition::Union(definition)
        }
        IntrospectionType::ENUM(enum_type) => {
            let mut definition = EnumType::new(enum_type.name.clone());
            definition.description = enum_type.description.clone();
            definition.values = enum_type
                .enum_values
                .iter()
                .map(enum_value_from_introspection)
                .collect();
            TypeDefinition::Enum(definition)
        }
        IntrospectionType::INPUT_OBJECT(input_object_type) => {
            let mut definition = InputObjectType::new(input_object_type.name.clone());
            definition.description = input_object_type.description.clone();
            definition.fields = input_object_type
                .input_fields
                .iter()
                .map(input_value_from_introspection)
                .collect::<Result<_, _>>()?;
            TypeDefinition::InputObject(definition)
        }
    };

    if type_definition_is_introspection(&type_definition) {
        return Ok(None);
    }

    Ok(Some(type_definition))
}

fn type_definition_is_introspection(type_definition: &TypeDefinition<'static, String>) -> bool {
    let name = match type_definition {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    };

    name.starts_with("__")
}

fn fields_from_introspection(
    fields: &[IntrospectionField],
) -> Result<Vec<Field<'static, String>>, IntrospectionError> {
    fields
        .iter()
        .map(|field| {
            Ok(Field {
                position: Pos::default(),
                description: field.description.clone(),
                name: field.name.clone(),
                arguments: field
                    .args
                    .iter()
                    .map(input_value_from_introspection)
                    .collect::<Result<_, _>>()?,
                field_type: output_type_from_ref(&field.type_ref, &field.name)?,
                directives: deprecation_directives(
                    field.is_deprecated,
                    field.deprecation_reason.as_ref(),
                ),
            })
        })
        .collect()
}

fn input_value_from_introspection(
    input_value: &IntrospectionInputValue,
) -> Result<InputValue<'static, String>, IntrospectionError> {
    let type_ref = input_value
        .type_ref
        .as_ref()
        .ok_or_else(|| IntrospectionError::IncompleteTypeRef(input_value.name.clone()))?;

    Ok(InputValue {
        position: Pos::default(),
        description: input_value.description.clone(),
        name: input_value.name.clone(),
        value_type: input_type_from_ref(type_ref, &input_value.name)?,
        default_value: None,
        directives: vec![],
    })
}

fn enum_value_from_introspection(enum_value: &IntrospectionEnumValue) -> EnumValue<'static, String> {
    let mut value = EnumValue::new(enum_value.name.clone());
    value.description = enum_value.description.clone();
    value.directives =
        deprecation_directives(enum_value.is_deprecated, enum_value.deprecation_reason.as_ref());
    value
}

fn deprecation_directives(
    is_deprecated: Option<bool>,
    reason: Option<&String>,
) -> Vec<Directive<'static, String>> {
    if is_deprecated != Some(true) {
        return vec![];
    }

    vec![Directive {
        position: Pos::default(),
        name: DEPRECATED_DIRECTIVE.to_string(),
        arguments: reason
            .map(|reason| ("reason".to_string(), Value::String(reason.clone())))
            .into_iter()
            .collect(),
    }]
}

fn output_type_from_ref(
    type_ref: &IntrospectionOutputTypeRef,
    owner: &str,
) -> Result<Type<'static, String>, IntrospectionError> {
    let incomplete = || IntrospectionError::IncompleteTypeRef(owner.to_string());

    Ok(match type_ref {
        IntrospectionOutputTypeRef::LIST { of_type } => Type::ListType(Box::new(
            output_type_from_ref(of_type.as_deref().ok_or_else(incomplete)?, owner)?,
        )),
        IntrospectionOutputTypeRef::NON_NULL { of_type } => Type::NonNullType(Box::new(
            output_type_from_ref(of_type.as_deref().ok_or_else(incomplete)?, owner)?,
        )),
        IntrospectionOutputTypeRef::SCALAR(named)
        | IntrospectionOutputTypeRef::ENUM(named)
        | IntrospectionOutputTypeRef::INPUT_OBJECT(named)
        | IntrospectionOutputTypeRef::UNION(named)
        | IntrospectionOutputTypeRef::OBJECT(named)
        | IntrospectionOutputTypeRef::INTERFACE(named) => Type::NamedType(named.name.clone()),
    })
}

fn input_type_from_ref(
    type_ref: &IntrospectionInputTypeRef,
    owner: &str,
) -> Result<Type<'static, String>, IntrospectionError> {
    let incomplete = || IntrospectionError::IncompleteTypeRef(owner.to_string());

    Ok(match type_ref {
        IntrospectionInputTypeRef::LIST { of_type } => Type::ListType(Box::new(
            input_type_from_ref(of_type.as_deref().ok_or_else(incomplete)?, owner)?,
        )),
        IntrospectionInputTypeRef::NON_NULL { of_type } => Type::NonNullType(Box::new(
            input_type_from_ref(of_type.as_deref().ok_or_else(incomplete)?, owner)?,
        )),
        IntrospectionInputTypeRef::SCALAR(named)
        | IntrospectionInputTypeRef::ENUM(named)
        | IntrospectionInputTypeRef::INPUT_OBJECT(named) => Type::NamedType(named.name.clone()),
    })
}
