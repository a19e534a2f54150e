use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Current template (pipeline tree, or a sequence of variables for `variables`)
    #[arg(long, value_name = "FILE")]
    pub template: PathBuf,

    /// Saved input set to carry over
    #[arg(long, value_name = "FILE")]
    pub input_set: PathBuf,

    /// Fully resolved values consulted for defaults
    #[arg(long, value_name = "FILE")]
    pub all_values: Option<PathBuf>,

    /// Backfill unresolved inputs from declared defaults
    #[arg(long)]
    pub use_default_values: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TreeFileArgs {
    /// YAML or JSON tree (`.json` is read as JSON, anything else as YAML)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Marker text, for example `<+input>.default(a).allowedValues(a,b)`
    #[arg(value_name = "MARKER", allow_hyphen_values = true)]
    pub marker: String,
}
