pub mod clear;
pub mod config;
pub mod error;
pub mod keyed_list;
pub mod reconcile;
pub mod runtime_input;
pub mod types;
pub mod variables;

pub use clear::{clear_runtime_input, replace_default_values, FieldRule, FieldRules};
pub use config::{ConfigLoader, ReconcilerConfig};
pub use error::AppError;
pub use keyed_list::{merge_keyed_list, KeyedListOptions};
pub use reconcile::{merge_template_with_input_set_data, MergeInputs, Reconciler};
pub use runtime_input::{collect_runtime_inputs, parse_marker, MarkerInfo, RuntimeInput};
pub use types::*;
pub use variables::{get_merged_variables, MergeVariables};
