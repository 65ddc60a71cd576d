mod error;
mod scalars;

use std::collections::HashSet;

use graphql_parser::query::{
    Definition, Field, FragmentDefinition, OperationDefinition, Selection, SelectionSet,
    TypeCondition,
};
use indexmap::IndexMap;
use rand::{seq::IndexedRandom, Rng};
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

pub use error::GenerationError;

use crate::{
    catalog::{FieldType, OperationKind, OutputType, TypeCatalog},
    data_set::DataSet,
    parsing::OperationDocument,
    TYPENAME_FIELD,
};

type AstField = Field<'static, String>;
type AstSelectionSet = SelectionSet<'static, String>;
type AstFragment = FragmentDefinition<'static, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    Data(Value),
    /// Dotted path (field names from the root) of the first selected field the
    /// schema does not declare.
    FieldNotFound(String),
}

enum Halt {
    FieldNotFound(String),
    Failed(GenerationError),
}

impl From<GenerationError> for Halt {
    fn from(error: GenerationError) -> Self {
        Halt::Failed(error)
    }
}

/// Fields sharing a response key, merged in document order.
struct CollectedField<'a> {
    name: &'a str,
    selection_sets: Vec<&'a AstSelectionSet>,
}

struct Synthesizer<'a, R: Rng + ?Sized> {
    catalog: &'a TypeCatalog,
    data_set: &'a DataSet,
    fragments: IndexMap<&'a str, &'a AstFragment>,
    rng: &'a mut R,
}

/// Produces a payload shaped like the single operation of `document`, with
/// random leaf values drawn from `rng` according to `data_set`.
///
/// A selected field missing from the catalog is not an error: the walk stops and
/// the path of that field is returned as [`SynthesisOutcome::FieldNotFound`].
#[instrument(level = "trace", skip_all)]
pub fn synthesize<R: Rng + ?Sized>(
    document: &OperationDocument,
    catalog: &TypeCatalog,
    data_set: &DataSet,
    rng: &mut R,
) -> Result<SynthesisOutcome, GenerationError> {
    data_set.validate()?;

    let operations: Vec<&OperationDefinition<'static, String>> = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Operation(operation) => Some(operation),
            Definition::Fragment(_) => None,
        })
        .collect();
    let [operation] = operations.as_slice() else {
        return Err(GenerationError::OperationCount(operations.len()));
    };

    let (kind, selection_set) = match *operation {
        OperationDefinition::SelectionSet(selection_set) => (OperationKind::Query, selection_set),
        OperationDefinition::Query(query) => (OperationKind::Query, &query.selection_set),
        OperationDefinition::Mutation(mutation) => {
            (OperationKind::Mutation, &mutation.selection_set)
        }
        OperationDefinition::Subscription(_) => {
            return Err(GenerationError::UnsupportedOperation(
                OperationKind::Subscription.as_str(),
            ))
        }
    };
    let root_type = catalog
        .root_type(kind)
        .ok_or(GenerationError::MissingRootType(kind.as_str()))?;

    let fragments: IndexMap<&str, &AstFragment> = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
            Definition::Operation(_) => None,
        })
        .collect();
    check_fragment_cycles(&fragments)?;

    trace!(root_type, fragments = fragments.len(), "synthesizing operation");

    let mut synthesizer = Synthesizer {
        catalog,
        data_set,
        fragments,
        rng,
    };

    match synthesizer.generate_object(root_type, &[selection_set], "") {
        Ok(data) => {
            debug!(root_type, "synthesized response");
            Ok(SynthesisOutcome::Data(data))
        }
        Err(Halt::FieldNotFound(path)) => {
            debug!(path, "selected field is not declared by the schema");
            Ok(SynthesisOutcome::FieldNotFound(path))
        }
        Err(Halt::Failed(error)) => Err(error),
    }
}

impl<'a, R: Rng + ?Sized> Synthesizer<'a, R> {
    fn generate_object(
        &mut self,
        type_name: &str,
        selection_sets: &[&'a AstSelectionSet],
        path: &str,
    ) -> Result<Value, Halt> {
        let catalog = self.catalog;
        let collected = self.collect_fields(type_name, selection_sets)?;
        let mut object = Map::with_capacity(collected.len());

        for (response_key, field) in collected {
            let field_path = join_path(path, field.name);
            let value = if field.name == TYPENAME_FIELD {
                Value::String(type_name.to_string())
            } else {
                let Some(field_type) = catalog.field_type(type_name, field.name) else {
                    return Err(Halt::FieldNotFound(field_path));
                };
                self.generate_value(field_type, &field.selection_sets, &field_path)?
            };
            object.insert(response_key.to_string(), value);
        }

        Ok(Value::Object(object))
    }

    fn generate_value(
        &mut self,
        field_type: &FieldType,
        selection_sets: &[&'a AstSelectionSet],
        path: &str,
    ) -> Result<Value, Halt> {
        match &field_type.of_type {
            OutputType::List(item_type) => {
                let mut items = Vec::with_capacity(self.data_set.array_length);
                for _ in 0..self.data_set.array_length {
                    items.push(self.generate_value(item_type, selection_sets, path)?);
                }
                Ok(Value::Array(items))
            }
            OutputType::Scalar(kind) => Ok(scalars::generate_scalar(
                kind,
                self.data_set,
                &mut *self.rng,
            )),
            OutputType::Enum(name) => self
                .catalog
                .enum_values(name)
                .unwrap_or_default()
                .choose(&mut *self.rng)
                .map(|value| Value::String(value.clone()))
                .ok_or_else(|| Halt::from(GenerationError::EmptyEnum(name.clone()))),
            OutputType::Object(name) => {
                ensure_selection(name, selection_sets, path)?;
                self.generate_object(name, selection_sets, path)
            }
            OutputType::Interface(name) | OutputType::Union(name) => {
                ensure_selection(name, selection_sets, path)?;
                let concrete_type = self.resolve_concrete_type(name, selection_sets, path)?;
                trace!(path, abstract_type = %name, concrete_type, "resolved abstract type");
                self.generate_object(concrete_type, selection_sets, path)
            }
        }
    }

    /// The first inline fragment or fragment spread, in source order, whose type
    /// condition is a member or implementer of `abstract_type`. Fragments without a
    /// condition or conditioned on `abstract_type` itself are searched in place.
    fn resolve_concrete_type(
        &self,
        abstract_type: &str,
        selection_sets: &[&'a AstSelectionSet],
        path: &str,
    ) -> Result<&'a str, GenerationError> {
        for &selection_set in selection_sets {
            if let Some(concrete_type) = self.find_concrete_type(abstract_type, selection_set)? {
                return Ok(concrete_type);
            }
        }

        Err(GenerationError::UnresolvedAbstractType {
            path: path.to_string(),
            abstract_type: abstract_type.to_string(),
        })
    }

    fn find_concrete_type(
        &self,
        abstract_type: &str,
        selection_set: &'a AstSelectionSet,
    ) -> Result<Option<&'a str>, GenerationError> {
        for selection in &selection_set.items {
            let (type_condition, nested) = match selection {
                Selection::Field(_) => continue,
                Selection::InlineFragment(inline_fragment) => (
                    inline_fragment.type_condition.as_ref(),
                    &inline_fragment.selection_set,
                ),
                Selection::FragmentSpread(spread) => {
                    let fragment = self.fragment(&spread.fragment_name)?;
                    (Some(&fragment.type_condition), &fragment.selection_set)
                }
            };

            let found = match type_condition {
                Some(TypeCondition::On(type_name))
                    if self.catalog.is_possible_type(abstract_type, type_name) =>
                {
                    Some(type_name.as_str())
                }
                Some(TypeCondition::On(type_name)) if type_name != abstract_type => None,
                _ => self.find_concrete_type(abstract_type, nested)?,
            };
            if found.is_some() {
                return Ok(found);
            }
        }

        Ok(None)
    }

    fn collect_fields(
        &self,
        type_name: &str,
        selection_sets: &[&'a AstSelectionSet],
    ) -> Result<IndexMap<&'a str, CollectedField<'a>>, GenerationError> {
        let mut collected = IndexMap::new();
        for &selection_set in selection_sets {
            self.collect_selection_set(type_name, selection_set, &mut collected)?;
        }

        Ok(collected)
    }

    fn collect_selection_set(
        &self,
        type_name: &str,
        selection_set: &'a AstSelectionSet,
        collected: &mut IndexMap<&'a str, CollectedField<'a>>,
    ) -> Result<(), GenerationError> {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    collect_field(field, collected);
                }
                Selection::InlineFragment(inline_fragment) => {
                    let applies = match &inline_fragment.type_condition {
                        None => true,
                        Some(TypeCondition::On(condition)) => {
                            self.catalog.satisfies_type_condition(type_name, condition)
                        }
                    };
                    if applies {
                        self.collect_selection_set(
                            type_name,
                            &inline_fragment.selection_set,
                            collected,
                        )?;
                    }
                }
                Selection::FragmentSpread(spread) => {
                    let fragment = self.fragment(&spread.fragment_name)?;
                    let TypeCondition::On(condition) = &fragment.type_condition;
                    if self.catalog.satisfies_type_condition(type_name, condition) {
                        self.collect_selection_set(type_name, &fragment.selection_set, collected)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn fragment(&self, name: &str) -> Result<&'a AstFragment, GenerationError> {
        self.fragments
            .get(name)
            .copied()
            .ok_or_else(|| GenerationError::UnknownFragment(name.to_string()))
    }
}

fn collect_field<'a>(field: &'a AstField, collected: &mut IndexMap<&'a str, CollectedField<'a>>) {
    let response_key = field.alias.as_deref().unwrap_or(field.name.as_str());
    collected
        .entry(response_key)
        .or_insert_with(|| CollectedField {
            name: &field.name,
            selection_sets: Vec::new(),
        })
        .selection_sets
        .push(&field.selection_set);
}

fn ensure_selection(
    type_name: &str,
    selection_sets: &[&AstSelectionSet],
    path: &str,
) -> Result<(), GenerationError> {
    if selection_sets
        .iter()
        .all(|selection_set| selection_set.items.is_empty())
    {
        return Err(GenerationError::MissingSelectionSet {
            path: path.to_string(),
            type_name: type_name.to_string(),
        });
    }

    Ok(())
}

pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

fn check_fragment_cycles<'a>(
    fragments: &IndexMap<&'a str, &'a AstFragment>,
) -> Result<(), GenerationError> {
    let mut verified = HashSet::new();
    let mut stack = Vec::new();
    for &name in fragments.keys() {
        visit_fragment(name, fragments, &mut stack, &mut verified)?;
    }

    Ok(())
}

fn visit_fragment<'a>(
    name: &'a str,
    fragments: &IndexMap<&'a str, &'a AstFragment>,
    stack: &mut Vec<&'a str>,
    verified: &mut HashSet<&'a str>,
) -> Result<(), GenerationError> {
    if verified.contains(name) {
        return Ok(());
    }
    if stack.contains(&name) {
        return Err(GenerationError::FragmentCycle(name.to_string()));
    }
    let fragment = fragments
        .get(name)
        .copied()
        .ok_or_else(|| GenerationError::UnknownFragment(name.to_string()))?;

    let mut spreads = Vec::new();
    fragment_spreads(&fragment.selection_set, &mut spreads);

    stack.push(name);
    for spread in spreads {
        visit_fragment(spread, fragments, stack, verified)?;
    }
    stack.pop();
    verified.insert(name);

    Ok(())
}

fn fragment_spreads<'a>(selection_set: &'a AstSelectionSet, spreads: &mut Vec<&'a str>) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => fragment_spreads(&field.selection_set, spreads),
            Selection::InlineFragment(inline_fragment) => {
                fragment_spreads(&inline_fragment.selection_set, spreads)
            }
            Selection::FragmentSpread(spread) => spreads.push(&spread.fragment_name),
        }
    }
}
