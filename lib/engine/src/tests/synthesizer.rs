use serde_json::Value;

use crate::{
    catalog::TypeCatalog,
    data_set::{BooleanValues, DataSet, DataSetError},
    parsing::parse_operation,
    synthesizer::{synthesize, GenerationError, SynthesisOutcome},
    tests::testkit::{
        init_logger, library_catalog, object_keys, seeded_rng, synthesize_data,
        synthesize_operation,
    },
    validator::validate,
};

const USER_SCHEMA: &str = r#"
type Query { user: User }
type User { id: ID! name: String age: Int }
"#;

#[test]
fn synthesizes_scalars_with_configured_shape() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let catalog = TypeCatalog::from_sdl(USER_SCHEMA)?;
    let data_set = DataSet {
        string_length: 4,
        num_range_start: 10,
        num_range_end: 10,
        ..DataSet::default()
    };

    let data = synthesize_data(&catalog, "query { user { id name age } }", &data_set);
    let user = &data["user"];

    assert_eq!(object_keys(&data), vec!["user"]);
    assert_eq!(object_keys(user), vec!["id", "name", "age"]);
    assert_eq!(user["id"].as_str().map(|s| s.chars().count()), Some(4));
    assert_eq!(user["name"].as_str().map(|s| s.chars().count()), Some(4));
    assert_eq!(user["age"], Value::from(10));

    Ok(())
}

#[test]
fn reports_missing_field_path() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let catalog = TypeCatalog::from_sdl(USER_SCHEMA)?;

    let outcome = synthesize_operation(&catalog, "query { user { email } }", &DataSet::default())?;
    assert_eq!(outcome, SynthesisOutcome::FieldNotFound("user.email".to_string()));

    let outcome = synthesize_operation(&catalog, "{ viewer { id } }", &DataSet::default())?;
    assert_eq!(outcome, SynthesisOutcome::FieldNotFound("viewer".to_string()));

    Ok(())
}

#[test]
fn honors_aliases_and_merges_repeated_keys() {
    init_logger();
    let catalog = library_catalog();

    let data = synthesize_data(
        &catalog,
        r#"
        query {
          me: user(id: "1") { id }
          user(id: "2") { name }
          me: user(id: "1") { role }
        }
        "#,
        &DataSet::default(),
    );

    assert_eq!(object_keys(&data), vec!["me", "user"]);
    assert_eq!(object_keys(&data["me"]), vec!["id", "role"]);
    assert_eq!(object_keys(&data["user"]), vec!["name"]);
}

#[test]
fn generates_lists_of_configured_length() {
    init_logger();
    let catalog = library_catalog();
    let data_set = DataSet {
        array_length: 3,
        ..DataSet::default()
    };

    let data = synthesize_data(&catalog, "{ users { tags friends { id } } }", &data_set);
    let users = data["users"].as_array().expect("users array");

    assert_eq!(users.len(), 3);
    for user in users {
        assert_eq!(user["tags"].as_array().map(Vec::len), Some(3));
        let friends = user["friends"].as_array().expect("friends array");
        assert_eq!(friends.len(), 3);
        assert!(friends.iter().all(|friend| friend["id"].is_string()));
    }

    let empty = synthesize_data(
        &catalog,
        "{ users { id } }",
        &DataSet {
            array_length: 0,
            ..DataSet::default()
        },
    );
    assert_eq!(empty["users"], Value::Array(vec![]));
}

#[test]
fn leaf_values_follow_declared_types() {
    init_logger();
    let catalog = library_catalog();
    let data_set = DataSet {
        num_range_start: -5,
        num_range_end: 5,
        digits_after_decimal: 2,
        boolean_values: BooleanValues::AlwaysFalse,
        is_special_allowed: false,
        string_length: 12,
        array_length: 5,
    };

    let data = synthesize_data(
        &catalog,
        "{ users { age score active role joinedAt } }",
        &data_set,
    );

    for user in data["users"].as_array().expect("users array") {
        let age = user["age"].as_i64().expect("age is an integer");
        assert!((-5..=5).contains(&age));

        let score = user["score"].as_f64().expect("score is a number");
        assert!((-5.0..=5.0).contains(&score));
        assert!(((score * 100.0).round() - score * 100.0).abs() < 1e-6);

        assert_eq!(user["active"], Value::Bool(false));
        assert!(["ADMIN", "EDITOR", "VIEWER"].contains(&user["role"].as_str().expect("role")));

        let joined_at = user["joinedAt"].as_str().expect("custom scalar as string");
        assert_eq!(joined_at.len(), 12);
        assert!(joined_at.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

#[test]
fn answers_typename_with_owner_type() {
    init_logger();
    let catalog = library_catalog();

    let data = synthesize_data(
        &catalog,
        "{ __typename user(id: \"1\") { kind: __typename id } }",
        &DataSet::default(),
    );

    assert_eq!(data["__typename"], Value::from("Query"));
    assert_eq!(data["user"]["kind"], Value::from("User"));
}

#[test]
fn resolves_union_by_first_matching_fragment() {
    init_logger();
    let catalog = library_catalog();

    let data = synthesize_data(
        &catalog,
        r#"
        {
          featured {
            __typename
            ... on Movie { title duration }
            ... on Book { title pages }
          }
        }
        "#,
        &DataSet::default(),
    );

    assert_eq!(object_keys(&data["featured"]), vec!["__typename", "title", "duration"]);
    assert_eq!(data["featured"]["__typename"], Value::from("Movie"));
}

#[test]
fn resolves_interface_with_common_fields_and_named_fragments() {
    init_logger();
    let catalog = library_catalog();

    let data = synthesize_data(
        &catalog,
        r#"
        query Lookup {
          node(id: "1") {
            id
            ...BookFields
            ... on User { name }
          }
        }

        fragment BookFields on Book {
          title
          ...Paging
        }

        fragment Paging on Book {
          pages
        }
        "#,
        &DataSet::default(),
    );

    assert_eq!(object_keys(&data["node"]), vec!["id", "title", "pages"]);
}

#[test]
fn typed_fragments_apply_to_matching_object_owner() {
    init_logger();
    let catalog = library_catalog();

    let data = synthesize_data(
        &catalog,
        r#"
        {
          user(id: "1") {
            ... on Node { id }
            ... on User { name }
            ... on Book { title }
            ... { age }
          }
        }
        "#,
        &DataSet::default(),
    );

    assert_eq!(object_keys(&data["user"]), vec!["id", "name", "age"]);
}

#[test]
fn fails_on_unresolved_abstract_selection() {
    init_logger();
    let catalog = library_catalog();

    let result = synthesize_operation(&catalog, "{ node(id: \"1\") { id } }", &DataSet::default());

    assert_eq!(
        result,
        Err(GenerationError::UnresolvedAbstractType {
            path: "node".to_string(),
            abstract_type: "Node".to_string(),
        })
    );
}

#[test]
fn fails_on_structural_problems() {
    init_logger();
    let catalog = library_catalog();
    let data_set = DataSet::default();
    let cases = [
        "fragment F on User { id }",
        "query A { users { id } } query B { users { id } }",
        "subscription { users { id } }",
        "{ users { ...Missing } }",
        "{ users { ...A } } fragment A on User { ...B } fragment B on User { ...A }",
        "{ users }",
    ];

    let errors: Vec<String> = cases
        .iter()
        .map(|operation| match synthesize_operation(&catalog, operation, &data_set) {
            Ok(outcome) => format!("{:?}", outcome),
            Err(err) => err.to_string(),
        })
        .collect();

    insta::assert_snapshot!(errors.join("\n"), @r#"
    Expected exactly one operation in the document, found 0
    Expected exactly one operation in the document, found 2
    Operation type "subscription" is not supported
    Unknown fragment "Missing"
    Fragment "A" spreads itself
    Field "users" of type "User" must have a selection of subfields
    "#);
}

#[test]
fn rejects_mutation_without_root_type() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let catalog = TypeCatalog::from_sdl(USER_SCHEMA)?;

    let result = synthesize_operation(&catalog, "mutation { user { id } }", &DataSet::default());
    assert_eq!(result, Err(GenerationError::MissingRootType("mutation")));

    Ok(())
}

#[test]
fn synthesizes_mutations() {
    init_logger();
    let catalog = library_catalog();

    let data = synthesize_data(
        &catalog,
        r#"mutation { createUser(input: { name: "Ada" }) { id role } }"#,
        &DataSet::default(),
    );

    assert_eq!(object_keys(&data["createUser"]), vec!["id", "role"]);
}

#[test]
fn rejects_invalid_data_set() {
    init_logger();
    let catalog = library_catalog();

    let zero_length = DataSet {
        string_length: 0,
        ..DataSet::default()
    };
    assert_eq!(
        synthesize_operation(&catalog, "{ users { id } }", &zero_length),
        Err(GenerationError::InvalidDataSet(DataSetError::ZeroStringLength))
    );

    let inverted = DataSet {
        num_range_start: 10,
        num_range_end: 1,
        ..DataSet::default()
    };
    assert_eq!(
        synthesize_operation(&catalog, "{ users { id } }", &inverted),
        Err(GenerationError::InvalidDataSet(DataSetError::InvertedRange {
            start: 10,
            end: 1
        }))
    );
}

#[test]
fn same_seed_gives_same_payload() {
    init_logger();
    let catalog = library_catalog();
    let document = parse_operation("{ users { id name age score active role } }")
        .expect("failed to parse operation");

    let first = synthesize(&document, &catalog, &DataSet::default(), &mut seeded_rng());
    let second = synthesize(&document, &catalog, &DataSet::default(), &mut seeded_rng());

    assert_eq!(first, second);
}

#[test]
fn synthesized_payloads_validate_cleanly() {
    init_logger();
    let catalog = library_catalog();
    let operations = [
        "{ users { id name age score active role joinedAt tags friends { id name } } }",
        "{ search(term: \"x\") { __typename ... on Book { id title pages } ... on Movie { id } } }",
        "{ featured { ... on Movie { title duration } } node(id: \"1\") { ... on User { id favorite { ... on Book { title } } } } }",
        "mutation { createUser(input: { name: \"Ada\" }) { id tags } }",
    ];

    for operation in operations {
        let data = synthesize_data(&catalog, operation, &DataSet::default());
        let report = validate(&data, &catalog);
        assert!(report.is_valid(), "{operation} produced {:?}", report);
    }
}

#[test]
fn union_members_sharing_a_field_name_validate_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let catalog = TypeCatalog::from_sdl(
        r#"
        type Query { item: Item }
        union Item = Counter | Label
        type Counter { value: Int }
        type Label { value: String }
        "#,
    )?;

    let data = synthesize_data(&catalog, "{ item { ... on Label { value } } }", &DataSet::default());
    assert!(data["item"]["value"].is_string());

    let report = validate(&data, &catalog);
    assert!(report.is_valid(), "{:?}", report);

    Ok(())
}

#[test]
fn concrete_type_is_found_inside_nested_fragments() {
    init_logger();
    let catalog = library_catalog();

    let data = synthesize_data(
        &catalog,
        r#"
        query { node(id: "1") { ...NodeFields } }
        fragment NodeFields on Node { id ... on Book { title } }
        "#,
        &DataSet::default(),
    );
    assert_eq!(object_keys(&data["node"]), vec!["id", "title"]);

    let data = synthesize_data(
        &catalog,
        "{ featured { ... { ... on Movie { duration } } } }",
        &DataSet::default(),
    );
    assert_eq!(object_keys(&data["featured"]), vec!["duration"]);
    assert!(data["featured"]["duration"].is_number());
}

#[test]
fn unrelated_fragment_conditions_are_not_searched() {
    init_logger();
    let catalog = library_catalog();

    let outcome = synthesize_operation(
        &catalog,
        "{ featured { ... on User { ... on Book { title } } } }",
        &DataSet::default(),
    );

    assert!(matches!(
        outcome,
        Err(GenerationError::UnresolvedAbstractType { .. })
    ));
}
