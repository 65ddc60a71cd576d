use lazy_static::lazy_static;
use rand::Rng;
use serde_json::Value;

use crate::{
    catalog::ScalarKind,
    data_set::{BooleanValues, DataSet},
};

const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const SPECIAL: &str = "!@#$%^&*()-_=+[]{};:,.<>?/|~";
// f64 carries ~15 significant decimal digits.
const MAX_DIGITS_AFTER_DECIMAL: u32 = 15;

lazy_static! {
    static ref ALPHANUMERIC_CHARS: Vec<char> = ALPHANUMERIC.chars().collect();
    static ref EXTENDED_CHARS: Vec<char> = ALPHANUMERIC.chars().chain(SPECIAL.chars()).collect();
}

pub(super) fn generate_scalar<R: Rng + ?Sized>(
    kind: &ScalarKind,
    data_set: &DataSet,
    rng: &mut R,
) -> Value {
    match kind {
        ScalarKind::Int => {
            Value::from(rng.random_range(data_set.num_range_start..=data_set.num_range_end))
        }
        ScalarKind::Float => Value::from(generate_float(data_set, rng)),
        ScalarKind::Boolean => Value::Bool(generate_boolean(data_set.boolean_values, rng)),
        ScalarKind::String | ScalarKind::ID | ScalarKind::Custom(_) => {
            Value::String(generate_string(data_set, rng))
        }
    }
}

fn generate_float<R: Rng + ?Sized>(data_set: &DataSet, rng: &mut R) -> f64 {
    let start = data_set.num_range_start as f64;
    let end = data_set.num_range_end as f64;
    let value = rng.random_range(start..=end);
    let factor = 10f64.powi(data_set.digits_after_decimal.min(MAX_DIGITS_AFTER_DECIMAL) as i32);

    ((value * factor).round() / factor).clamp(start, end)
}

fn generate_boolean<R: Rng + ?Sized>(boolean_values: BooleanValues, rng: &mut R) -> bool {
    match boolean_values {
        BooleanValues::AlwaysTrue => true,
        BooleanValues::AlwaysFalse => false,
        BooleanValues::Random => rng.random_bool(0.5),
    }
}

fn generate_string<R: Rng + ?Sized>(data_set: &DataSet, rng: &mut R) -> String {
    let alphabet: &[char] = if data_set.is_special_allowed {
        &EXTENDED_CHARS
    } else {
        &ALPHANUMERIC_CHARS
    };

    (0..data_set.string_length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}
