mod error;
mod field_type;

use std::collections::{HashMap, HashSet};

use graphql_parser::schema::{Definition, Field, SchemaDefinition, TypeDefinition, TypeExtension};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, instrument};

pub use error::SchemaMalformedError;
pub use field_type::{FieldType, OutputType, ScalarKind, BUILTIN_SCALARS};

use crate::parsing::{parse_schema, SchemaDocument};
use field_type::{resolve_field_type, TypeKind};

const INTROSPECTION_PREFIX: &str = "__";
const DEFAULT_QUERY_TYPE: &str = "Query";
const DEFAULT_MUTATION_TYPE: &str = "Mutation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

/// Lookup tables derived from a schema document.
///
/// A catalog is immutable once built and is a pure function of the document it
/// was built from. Every base type referenced by a field descriptor is either a
/// scalar (built-in or declared), an object/interface with its own entry in the
/// field table, an enum or a union.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCatalog {
    field_types: HashMap<String, IndexMap<String, FieldType>>,
    enum_types: HashMap<String, Vec<String>>,
    union_types: HashMap<String, IndexSet<String>>,
    interface_types: HashMap<String, IndexSet<String>>,
    object_types: HashSet<String>,
    scalar_types: HashSet<String>,
    query_type: String,
    mutation_type: Option<String>,
}

impl TypeCatalog {
    pub fn from_sdl(sdl: &str) -> Result<Self, SchemaMalformedError> {
        let document =
            parse_schema(sdl).map_err(|err| SchemaMalformedError::Parse(err.to_string()))?;

        Self::build(&document)
    }

    #[instrument(level = "trace", skip_all)]
    pub fn build(document: &SchemaDocument) -> Result<Self, SchemaMalformedError> {
        let kinds = collect_type_kinds(document)?;
        let mut catalog = TypeCatalog {
            field_types: HashMap::new(),
            enum_types: HashMap::new(),
            union_types: HashMap::new(),
            interface_types: HashMap::new(),
            object_types: HashSet::new(),
            scalar_types: HashSet::new(),
            query_type: DEFAULT_QUERY_TYPE.to_string(),
            mutation_type: None,
        };
        let mut schema_definition: Option<&SchemaDefinition<'static, String>> = None;

        for definition in &document.definitions {
            match definition {
                Definition::SchemaDefinition(definition) => schema_definition = Some(definition),
                Definition::TypeDefinition(type_definition) => {
                    catalog.add_type_definition(type_definition, &kinds)?
                }
                Definition::TypeExtension(_) | Definition::DirectiveDefinition(_) => {}
            }
        }

        // Extensions may precede the definition they extend.
        for definition in &document.definitions {
            if let Definition::TypeExtension(extension) = definition {
                catalog.add_type_extension(extension, &kinds)?;
            }
        }

        for definition in &document.definitions {
            if let Definition::TypeDefinition(TypeDefinition::Enum(enum_type)) = definition {
                let is_empty = catalog
                    .enum_types
                    .get(&enum_type.name)
                    .is_none_or(|values| values.is_empty());
                if is_empty && !enum_type.name.starts_with(INTROSPECTION_PREFIX) {
                    return Err(SchemaMalformedError::EmptyEnum(enum_type.name.clone()));
                }
            }
        }

        catalog.resolve_root_types(schema_definition)?;

        debug!(
            object_types = catalog.object_types.len(),
            interface_types = catalog.interface_types.len(),
            union_types = catalog.union_types.len(),
            enum_types = catalog.enum_types.len(),
            "type catalog built"
        );

        Ok(catalog)
    }

    pub fn field_type(&self, owner: &str, field: &str) -> Option<&FieldType> {
        self.field_types
            .get(owner)
            .and_then(|fields| fields.get(field))
    }

    pub fn fields(&self, owner: &str) -> Option<&IndexMap<String, FieldType>> {
        self.field_types.get(owner)
    }

    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enum_types.get(name).map(Vec::as_slice)
    }

    pub fn union_members(&self, name: &str) -> Option<&IndexSet<String>> {
        self.union_types.get(name)
    }

    pub fn implementers(&self, name: &str) -> Option<&IndexSet<String>> {
        self.interface_types.get(name)
    }

    /// Concrete object types a value of the given union or interface may take.
    pub fn possible_types(&self, abstract_type: &str) -> Option<&IndexSet<String>> {
        self.union_types
            .get(abstract_type)
            .or_else(|| self.interface_types.get(abstract_type))
    }

    pub fn is_possible_type(&self, abstract_type: &str, concrete_type: &str) -> bool {
        self.possible_types(abstract_type)
            .is_some_and(|possible_types| possible_types.contains(concrete_type))
    }

    /// Whether a fragment with the given type condition applies to a value of
    /// `concrete_type`.
    pub fn satisfies_type_condition(&self, concrete_type: &str, type_condition: &str) -> bool {
        concrete_type == type_condition || self.is_possible_type(type_condition, concrete_type)
    }

    pub fn is_object_type(&self, name: &str) -> bool {
        self.object_types.contains(name)
    }

    pub fn is_scalar_type(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || self.scalar_types.contains(name)
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn root_type(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => Some(self.query_type()),
            OperationKind::Mutation => self.mutation_type(),
            OperationKind::Subscription => None,
        }
    }

    pub fn field_types(&self) -> &HashMap<String, IndexMap<String, FieldType>> {
        &self.field_types
    }

    pub fn enum_types(&self) -> &HashMap<String, Vec<String>> {
        &self.enum_types
    }

    pub fn union_types(&self) -> &HashMap<String, IndexSet<String>> {
        &self.union_types
    }

    pub fn interface_types(&self) -> &HashMap<String, IndexSet<String>> {
        &self.interface_types
    }

    fn add_type_definition(
        &mut self,
        type_definition: &TypeDefinition<'static, String>,
        kinds: &HashMap<String, TypeKind>,
    ) -> Result<(), SchemaMalformedError> {
        if type_definition_name(type_definition).starts_with(INTROSPECTION_PREFIX) {
            return Ok(());
        }

        match type_definition {
            TypeDefinition::Object(object_type) => {
                self.object_types.insert(object_type.name.clone());
                self.add_fields(&object_type.name, &object_type.fields, kinds)?;
                self.add_implementations(
                    &object_type.name,
                    &object_type.implements_interfaces,
                    kinds,
                )?;
            }
            TypeDefinition::Interface(interface_type) => {
                self.add_fields(&interface_type.name, &interface_type.fields, kinds)?;
                self.interface_types
                    .entry(interface_type.name.clone())
                    .or_default();
            }
            TypeDefinition::Union(union_type) => {
                self.add_union_members(&union_type.name, &union_type.types, kinds)?;
            }
            TypeDefinition::Enum(enum_type) => {
                self.enum_types
                    .entry(enum_type.name.clone())
                    .or_default()
                    .extend(enum_type.values.iter().map(|value| value.name.clone()));
            }
            TypeDefinition::Scalar(scalar_type) => {
                if !BUILTIN_SCALARS.contains(&scalar_type.name.as_str()) {
                    self.scalar_types.insert(scalar_type.name.clone());
                }
            }
            TypeDefinition::InputObject(_) => {}
        }

        Ok(())
    }

    fn add_type_extension(
        &mut self,
        extension: &TypeExtension<'static, String>,
        kinds: &HashMap<String, TypeKind>,
    ) -> Result<(), SchemaMalformedError> {
        match extension {
            TypeExtension::Object(object_extension) => {
                expect_kind(&object_extension.name, TypeKind::Object, kinds)?;
                self.add_fields(&object_extension.name, &object_extension.fields, kinds)?;
                self.add_implementations(
                    &object_extension.name,
                    &object_extension.implements_interfaces,
                    kinds,
                )?;
            }
            TypeExtension::Interface(interface_extension) => {
                expect_kind(&interface_extension.name, TypeKind::Interface, kinds)?;
                self.add_fields(
                    &interface_extension.name,
                    &interface_extension.fields,
                    kinds,
                )?;
            }
            TypeExtension::Union(union_extension) => {
                expect_kind(&union_extension.name, TypeKind::Union, kinds)?;
                self.add_union_members(&union_extension.name, &union_extension.types, kinds)?;
            }
            TypeExtension::Enum(enum_extension) => {
                expect_kind(&enum_extension.name, TypeKind::Enum, kinds)?;
                self.enum_types
                    .entry(enum_extension.name.clone())
                    .or_default()
                    .extend(enum_extension.values.iter().map(|value| value.name.clone()));
            }
            TypeExtension::Scalar(scalar_extension) => {
                expect_kind(&scalar_extension.name, TypeKind::Scalar, kinds)?;
            }
            TypeExtension::InputObject(input_extension) => {
                expect_kind(&input_extension.name, TypeKind::InputObject, kinds)?;
            }
        }

        Ok(())
    }

    fn add_fields(
        &mut self,
        owner: &str,
        fields: &[Field<'static, String>],
        kinds: &HashMap<String, TypeKind>,
    ) -> Result<(), SchemaMalformedError> {
        let owner_fields = self.field_types.entry(owner.to_string()).or_default();
        for field in fields {
            if field.name.starts_with(INTROSPECTION_PREFIX) {
                continue;
            }
            let field_type = resolve_field_type(&field.field_type, kinds, owner, &field.name)?;
            if owner_fields.insert(field.name.clone(), field_type).is_some() {
                return Err(SchemaMalformedError::DuplicateField {
                    owner: owner.to_string(),
                    field: field.name.clone(),
                });
            }
        }

        Ok(())
    }

    fn add_implementations(
        &mut self,
        type_name: &str,
        interfaces: &[String],
        kinds: &HashMap<String, TypeKind>,
    ) -> Result<(), SchemaMalformedError> {
        for interface in interfaces {
            if kinds.get(interface) != Some(&TypeKind::Interface) {
                return Err(SchemaMalformedError::InvalidInterface {
                    type_name: type_name.to_string(),
                    interface: interface.clone(),
                });
            }
            self.interface_types
                .entry(interface.clone())
                .or_default()
                .insert(type_name.to_string());
        }

        Ok(())
    }

    fn add_union_members(
        &mut self,
        union_name: &str,
        members: &[String],
        kinds: &HashMap<String, TypeKind>,
    ) -> Result<(), SchemaMalformedError> {
        let union_members = self.union_types.entry(union_name.to_string()).or_default();
        for member in members {
            if kinds.get(member) != Some(&TypeKind::Object) {
                return Err(SchemaMalformedError::InvalidUnionMember {
                    union_name: union_name.to_string(),
                    member: member.clone(),
                });
            }
            union_members.insert(member.clone());
        }

        Ok(())
    }

    fn resolve_root_types(
        &mut self,
        schema_definition: Option<&SchemaDefinition<'static, String>>,
    ) -> Result<(), SchemaMalformedError> {
        let explicit_query = schema_definition.and_then(|definition| definition.query.clone());
        let explicit_mutation =
            schema_definition.and_then(|definition| definition.mutation.clone());

        match explicit_query {
            Some(query_type) if self.object_types.contains(&query_type) => {
                self.query_type = query_type
            }
            Some(query_type) => return Err(SchemaMalformedError::InvalidRootType(query_type)),
            None if self.object_types.contains(DEFAULT_QUERY_TYPE) => {
                self.query_type = DEFAULT_QUERY_TYPE.to_string()
            }
            None => return Err(SchemaMalformedError::MissingQueryType),
        }

        self.mutation_type = match explicit_mutation {
            Some(mutation_type) if self.object_types.contains(&mutation_type) => {
                Some(mutation_type)
            }
            Some(mutation_type) => {
                return Err(SchemaMalformedError::InvalidRootType(mutation_type))
            }
            None => self
                .object_types
                .contains(DEFAULT_MUTATION_TYPE)
                .then(|| DEFAULT_MUTATION_TYPE.to_string()),
        };

        Ok(())
    }
}

fn collect_type_kinds(
    document: &SchemaDocument,
) -> Result<HashMap<String, TypeKind>, SchemaMalformedError> {
    let mut kinds: HashMap<String, TypeKind> = BUILTIN_SCALARS
        .iter()
        .map(|name| (name.to_string(), TypeKind::Scalar))
        .collect();

    for definition in &document.definitions {
        let Definition::TypeDefinition(type_definition) = definition else {
            continue;
        };
        let name = type_definition_name(type_definition);
        if name.starts_with(INTROSPECTION_PREFIX) {
            continue;
        }

        let kind = match type_definition {
            TypeDefinition::Scalar(_) => TypeKind::Scalar,
            TypeDefinition::Object(_) => TypeKind::Object,
            TypeDefinition::Interface(_) => TypeKind::Interface,
            TypeDefinition::Union(_) => TypeKind::Union,
            TypeDefinition::Enum(_) => TypeKind::Enum,
            TypeDefinition::InputObject(_) => TypeKind::InputObject,
        };
        // Printed schemas sometimes declare the built-in scalars explicitly.
        if kind == TypeKind::Scalar && BUILTIN_SCALARS.contains(&name) {
            continue;
        }
        if kinds.insert(name.to_string(), kind).is_some() {
            return Err(SchemaMalformedError::DuplicateType(name.to_string()));
        }
    }

    Ok(kinds)
}

fn expect_kind(
    name: &str,
    kind: TypeKind,
    kinds: &HashMap<String, TypeKind>,
) -> Result<(), SchemaMalformedError> {
    if kinds.get(name) == Some(&kind) {
        Ok(())
    } else {
        Err(SchemaMalformedError::UnknownExtensionTarget(name.to_string()))
    }
}

fn type_definition_name<'a>(type_definition: &'a TypeDefinition<'static, String>) -> &'a str {
    match type_definition {
        TypeDefinition::Scalar(scalar_type) => &scalar_type.name,
        TypeDefinition::Object(object_type) => &object_type.name,
        TypeDefinition::Interface(interface_type) => &interface_type.name,
        TypeDefinition::Union(union_type) => &union_type.name,
        TypeDefinition::Enum(enum_type) => &enum_type.name,
        TypeDefinition::InputObject(input_object_type) => &input_object_type.name,
    }
}
