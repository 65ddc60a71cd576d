use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-invocation parameters for randomized leaf values.
///
/// Every field is optional at the boundary; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataSet {
    /// Length of generated `String`, `ID` and custom scalar values.
    #[serde(default = "default_string_length", alias = "stringLength")]
    pub string_length: usize,
    /// Number of elements generated for every list field.
    #[serde(default = "default_array_length", alias = "arrayLength")]
    pub array_length: usize,
    /// Whether generated strings may contain punctuation characters.
    #[serde(default = "default_is_special_allowed", alias = "isSpecialAllowed")]
    pub is_special_allowed: bool,
    #[serde(default, alias = "booleanValues")]
    pub boolean_values: BooleanValues,
    /// Inclusive lower bound for `Int` and `Float` values.
    #[serde(default = "default_num_range_start", alias = "numRangeStart")]
    pub num_range_start: i64,
    /// Inclusive upper bound for `Int` and `Float` values.
    #[serde(default = "default_num_range_end", alias = "numRangeEnd")]
    pub num_range_end: i64,
    #[serde(default = "default_digits_after_decimal", alias = "digitsAfterDecimal")]
    pub digits_after_decimal: u32,
}

fn default_string_length() -> usize {
    8
}

fn default_array_length() -> usize {
    4
}

fn default_is_special_allowed() -> bool {
    true
}

fn default_num_range_start() -> i64 {
    1
}

fn default_num_range_end() -> i64 {
    1000
}

fn default_digits_after_decimal() -> u32 {
    2
}

impl Default for DataSet {
    fn default() -> Self {
        Self {
            string_length: default_string_length(),
            array_length: default_array_length(),
            is_special_allowed: default_is_special_allowed(),
            boolean_values: BooleanValues::default(),
            num_range_start: default_num_range_start(),
            num_range_end: default_num_range_end(),
            digits_after_decimal: default_digits_after_decimal(),
        }
    }
}

impl DataSet {
    pub fn validate(&self) -> Result<(), DataSetError> {
        if self.string_length == 0 {
            return Err(DataSetError::ZeroStringLength);
        }
        if self.num_range_start > self.num_range_end {
            return Err(DataSetError::InvertedRange {
                start: self.num_range_start,
                end: self.num_range_end,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanValues {
    #[serde(rename = "true")]
    AlwaysTrue,
    #[serde(rename = "false")]
    AlwaysFalse,
    #[default]
    Random,
}

impl BooleanValues {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanValues::AlwaysTrue => "true",
            BooleanValues::AlwaysFalse => "false",
            BooleanValues::Random => "random",
        }
    }
}

impl FromStr for BooleanValues {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "true" => Ok(BooleanValues::AlwaysTrue),
            "false" => Ok(BooleanValues::AlwaysFalse),
            "random" => Ok(BooleanValues::Random),
            _ => Err(format!("Invalid boolean values mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataSetError {
    #[error("string_length must be at least 1")]
    ZeroStringLength,
    #[error("num_range_start ({start}) must not be greater than num_range_end ({end})")]
    InvertedRange { start: i64, end: i64 },
}
