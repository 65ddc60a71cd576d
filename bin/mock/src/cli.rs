use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use graphql_mock_engine::data_set::{BooleanValues, DataSet};

/// Schema-directed mock responses for GraphQL operations
#[derive(Parser, Debug)]
#[command(name = "graphql_mock", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file. Defaults to `mock.config.{yaml,yml,json,json5}`
    /// in the working directory.
    #[arg(short, long, global = true, env = "GRAPHQL_MOCK_CONFIG_FILE_PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synthesize a random response for an operation against a local schema
    Generate(GenerateArgs),
    /// Check a response payload against a local schema
    Validate(ValidateArgs),
    /// Answer a mock request for a live endpoint, introspecting it when its
    /// schema is not stored yet
    Mock(MockArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// SDL file describing the schema
    #[arg(long)]
    pub schema: PathBuf,

    /// File holding the operation document
    #[arg(long)]
    pub document: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub data_set: DataSetArgs,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// SDL file describing the schema
    #[arg(long)]
    pub schema: PathBuf,

    /// JSON response to check. Its `data` member is validated when present,
    /// otherwise the whole document.
    #[arg(long)]
    pub payload: PathBuf,
}

#[derive(Args, Debug)]
pub struct MockArgs {
    /// URL of the GraphQL endpoint whose schema drives the response
    #[arg(long)]
    pub endpoint: String,

    /// File holding the operation document. Without it the mock response is
    /// returned as is.
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// File holding a user supplied response (`{"data": ...}`)
    #[arg(long = "mock")]
    pub mock_response: Option<PathBuf>,

    /// Validate the mock response instead of synthesizing a random one
    #[arg(long)]
    pub validate: bool,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub data_set: DataSetArgs,
}

/// Overrides for the configured data set.
#[derive(Args, Debug, Default)]
pub struct DataSetArgs {
    #[arg(long)]
    pub string_length: Option<usize>,

    #[arg(long)]
    pub array_length: Option<usize>,

    /// Allow punctuation characters in generated strings
    #[arg(long)]
    pub special_allowed: Option<bool>,

    /// One of `true`, `false` or `random`
    #[arg(long)]
    pub boolean_values: Option<BooleanValues>,

    #[arg(long, allow_negative_numbers = true)]
    pub num_range_start: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub num_range_end: Option<i64>,

    #[arg(long)]
    pub digits_after_decimal: Option<u32>,
}

impl DataSetArgs {
    pub fn apply(&self, mut data_set: DataSet) -> DataSet {
        if let Some(string_length) = self.string_length {
            data_set.string_length = string_length;
        }
        if let Some(array_length) = self.array_length {
            data_set.array_length = array_length;
        }
        if let Some(special_allowed) = self.special_allowed {
            data_set.is_special_allowed = special_allowed;
        }
        if let Some(boolean_values) = self.boolean_values {
            data_set.boolean_values = boolean_values;
        }
        if let Some(start) = self.num_range_start {
            data_set.num_range_start = start;
        }
        if let Some(end) = self.num_range_end {
            data_set.num_range_end = end;
        }
        if let Some(digits) = self.digits_after_decimal {
            data_set.digits_after_decimal = digits;
        }

        data_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_with_overrides() {
        let cli = Cli::parse_from([
            "graphql_mock",
            "generate",
            "--schema",
            "schema.graphql",
            "--document",
            "query.graphql",
            "--seed",
            "7",
            "--array-length",
            "2",
            "--boolean-values",
            "false",
            "--num-range-start",
            "-10",
        ]);

        let Command::Generate(args) = cli.command else {
            panic!("expected the generate command");
        };
        assert_eq!(args.schema, PathBuf::from("schema.graphql"));
        assert_eq!(args.seed, Some(7));

        let data_set = args.data_set.apply(DataSet::default());
        assert_eq!(data_set.array_length, 2);
        assert_eq!(data_set.boolean_values, BooleanValues::AlwaysFalse);
        assert_eq!(data_set.num_range_start, -10);
        assert_eq!(data_set.string_length, DataSet::default().string_length);
    }

    #[test]
    fn mock_defaults_to_synthesis() {
        let cli = Cli::parse_from([
            "graphql_mock",
            "mock",
            "--endpoint",
            "https://api.example.com/graphql",
        ]);

        let Command::Mock(args) = cli.command else {
            panic!("expected the mock command");
        };
        assert!(!args.validate);
        assert!(args.document.is_none());
        assert!(args.mock_response.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from([
            "graphql_mock",
            "validate",
            "--schema",
            "schema.graphql",
            "--payload",
            "response.json",
            "--config",
            "custom.yaml",
        ]);

        assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
    }

    #[test]
    fn without_overrides_data_set_is_unchanged() {
        let configured = DataSet {
            string_length: 3,
            ..DataSet::default()
        };

        assert_eq!(DataSetArgs::default().apply(configured.clone()), configured);
    }
}
