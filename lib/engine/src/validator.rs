use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use crate::{
    catalog::{FieldType, OutputType, ScalarKind, TypeCatalog},
    synthesizer::join_path,
    TYPENAME_FIELD,
};

/// Diagnostics for a payload checked against a catalog. Both sequences follow
/// payload traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Paths whose value kind disagrees with the declared type, or that hold
    /// `null` where the type is non-null.
    pub errors: Vec<String>,
    /// Paths of payload keys the owning type does not declare.
    pub field_not_found: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.field_not_found.is_empty()
    }
}

/// Walks `payload` (the `data` member of a response) against the catalog and
/// reports every mismatch, never stopping at the first one.
#[instrument(level = "trace", skip_all)]
pub fn validate(payload: &Value, catalog: &TypeCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Value::Object(root) = payload else {
        report.errors.push(catalog.query_type().to_string());
        return report;
    };

    let validator = Validator { catalog };
    let root_types: Vec<&str> = [Some(catalog.query_type()), catalog.mutation_type()]
        .into_iter()
        .flatten()
        .collect();

    for (key, value) in root {
        if key == TYPENAME_FIELD {
            validator.validate_typename(value, key, &mut report);
            continue;
        }

        let field_type = root_types
            .iter()
            .find_map(|root_type| catalog.field_type(root_type, key));
        match field_type {
            Some(field_type) => validator.validate_value(field_type, value, key, &mut report),
            None => report.field_not_found.push(key.clone()),
        }
    }

    debug!(
        errors = report.errors.len(),
        field_not_found = report.field_not_found.len(),
        "validated payload"
    );

    report
}

struct Validator<'a> {
    catalog: &'a TypeCatalog,
}

impl Validator<'_> {
    fn validate_object(
        &self,
        type_name: &str,
        object: &Map<String, Value>,
        path: &str,
        report: &mut ValidationReport,
    ) {
        for (key, value) in object {
            let field_path = join_path(path, key);
            if key == TYPENAME_FIELD {
                self.validate_typename(value, &field_path, report);
                continue;
            }

            match self.catalog.field_type(type_name, key) {
                Some(field_type) => self.validate_value(field_type, value, &field_path, report),
                None => report.field_not_found.push(field_path),
            }
        }
    }

    fn validate_value(
        &self,
        field_type: &FieldType,
        value: &Value,
        path: &str,
        report: &mut ValidationReport,
    ) {
        if value.is_null() {
            if field_type.non_null {
                report.errors.push(path.to_string());
            }
            return;
        }

        let matches = match (&field_type.of_type, value) {
            (OutputType::List(item_type), Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    self.validate_value(item_type, item, &format!("{path}[{index}]"), report);
                }
                true
            }
            (OutputType::Scalar(kind), value) => scalar_matches(kind, value),
            (OutputType::Enum(name), Value::String(literal)) => self
                .catalog
                .enum_values(name)
                .is_some_and(|values| values.contains(literal)),
            (OutputType::Object(name), Value::Object(object)) => {
                self.validate_object(name, object, path, report);
                true
            }
            (OutputType::Interface(name) | OutputType::Union(name), Value::Object(object)) => {
                let concrete_type = self.resolve_concrete_type(name, object, path, report);
                self.validate_object(concrete_type, object, path, report);
                true
            }
            _ => false,
        };

        if !matches {
            report.errors.push(path.to_string());
        }
    }

    fn validate_typename(&self, value: &Value, path: &str, report: &mut ValidationReport) {
        if !value.is_string() {
            report.errors.push(path.to_string());
        }
    }

    /// Picks the object type to check an abstract-typed value against: the type
    /// named by a valid `__typename`, else the member or implementer declaring the
    /// most of the value's keys, else the abstract type itself. Candidates tied on
    /// key coverage are checked against the value and the one with the fewest
    /// diagnostics wins, earliest declared on a further tie.
    fn resolve_concrete_type<'b>(
        &'b self,
        abstract_type: &'b str,
        object: &Map<String, Value>,
        path: &str,
        report: &mut ValidationReport,
    ) -> &'b str {
        let Some(possible_types) = self.catalog.possible_types(abstract_type) else {
            return abstract_type;
        };

        if let Some(Value::String(type_name)) = object.get(TYPENAME_FIELD) {
            if let Some(concrete_type) = possible_types.get(type_name) {
                return concrete_type;
            }
            report.errors.push(join_path(path, TYPENAME_FIELD));
        }

        let coverage = |candidate: &str| {
            object
                .keys()
                .filter(|key| self.catalog.field_type(candidate, key).is_some())
                .count()
        };
        let Some(best_coverage) = possible_types.iter().map(|t| coverage(t)).max() else {
            return abstract_type;
        };
        let tied: Vec<&str> = possible_types
            .iter()
            .map(String::as_str)
            .filter(|candidate| coverage(candidate) == best_coverage)
            .collect();

        let concrete_type = match tied.as_slice() {
            [] => abstract_type,
            [only] => *only,
            _ => self
                .fewest_diagnostics(&tied, object, path)
                .unwrap_or(abstract_type),
        };
        trace!(path, abstract_type, concrete_type, best_coverage, "inferred concrete type");

        concrete_type
    }

    /// Candidate whose fields report the fewest diagnostics for `object`,
    /// earliest declared on ties.
    fn fewest_diagnostics<'b>(
        &self,
        candidates: &[&'b str],
        object: &Map<String, Value>,
        path: &str,
    ) -> Option<&'b str> {
        let mut best: Option<(&'b str, usize)> = None;
        for &candidate in candidates {
            let mut scratch = ValidationReport::default();
            self.validate_object(candidate, object, path, &mut scratch);
            let diagnostics = scratch.errors.len() + scratch.field_not_found.len();
            if best.is_none_or(|(_, fewest)| diagnostics < fewest) {
                best = Some((candidate, diagnostics));
            }
        }

        best.map(|(candidate, _)| candidate)
    }
}

fn scalar_matches(kind: &ScalarKind, value: &Value) -> bool {
    match kind {
        ScalarKind::Int => value.is_i64() || value.is_u64(),
        ScalarKind::Float => value.is_number(),
        ScalarKind::String | ScalarKind::ID => value.is_string(),
        ScalarKind::Boolean => value.is_boolean(),
        ScalarKind::Custom(_) => true,
    }
}
