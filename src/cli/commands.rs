#![allow(clippy::result_large_err)]

use crate::{
    cli::args::{InspectArgs, MergeArgs, TreeFileArgs},
    core::{
        clear::{clear_runtime_input_with, replace_default_values, ClearSummary},
        config::{ConfigLoader, ReconcilerConfig},
        error::AppError,
        reconcile::{MergeInputs, Reconciler, PIPELINE_KEY},
        runtime_input::{collect_runtime_inputs, MarkerInfo, Qualifier, RuntimeInput},
        types::{ErrorCategory, TreeFormat},
        variables::{get_merged_variables, MergeVariables},
    },
    utils::serialization::{render_tree, FileUtils},
    Result,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Root key of a saved input-set document wrapping its pipeline.
const INPUT_SET_KEY: &str = "inputSet";

/// Load `--config` when given, otherwise `reconciler.toml` in the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<ReconcilerConfig> {
    let config = match explicit {
        Some(path) => ConfigLoader::load_explicit(path)?,
        None => ConfigLoader::load_from_workspace(&env::current_dir()?)?,
    };
    Ok(config)
}

/// Where command results are written and in which format.
#[derive(Debug, Clone)]
pub struct OutputSink {
    format: TreeFormat,
    path: Option<PathBuf>,
}

impl OutputSink {
    pub fn new(format: TreeFormat, path: Option<PathBuf>) -> Self {
        Self { format, path }
    }

    pub fn emit_tree(&self, tree: &Value) -> Result<()> {
        match &self.path {
            Some(path) => FileUtils::write_tree(path, tree, self.format)?,
            None => self.emit_text(&render_tree(tree, self.format)?)?,
        }
        Ok(())
    }

    pub fn emit_text(&self, text: &str) -> Result<()> {
        match &self.path {
            Some(path) => fs::write(path, text).map_err(|e| {
                AppError::new(
                    ErrorCategory::IoError,
                    format!("Failed to write {}: {}", path.display(), e),
                )
                .with_code("RCN-IO-002")
            })?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

pub fn merge(args: &MergeArgs, config: &ReconcilerConfig, sink: &OutputSink) -> Result<()> {
    let template = FileUtils::read_tree(&args.template)?;
    let input_set = input_set_portion(FileUtils::read_tree(&args.input_set)?);
    let all_values = read_optional(args.all_values.as_deref())?.unwrap_or_else(empty_tree);
    let use_defaults = args.use_default_values || config.merge.use_default_values;

    let reconciler =
        Reconciler::new().with_variable_identity_field(&config.merge.variable_identity_field);
    let merged = reconciler.merge(MergeInputs {
        template_pipeline: &template,
        input_set_portion: &input_set,
        all_values: &all_values,
        should_use_default_values: use_defaults,
    });
    tracing::info!(
        template = %args.template.display(),
        input_set = %args.input_set.display(),
        "merged input set"
    );
    sink.emit_tree(&merged)
}

pub fn clear(args: &TreeFileArgs, config: &ReconcilerConfig, sink: &OutputSink) -> Result<()> {
    let tree = FileUtils::read_tree(&args.file)?;
    let rules = config.field_rules();
    let summary = ClearSummary::of(&tree, &rules);
    tracing::debug!(outcomes = ?summary.outcomes, "clearing runtime inputs");
    sink.emit_tree(&clear_runtime_input_with(&tree, &rules))
}

pub fn defaults(args: &TreeFileArgs, sink: &OutputSink) -> Result<()> {
    let tree = FileUtils::read_tree(&args.file)?;
    sink.emit_tree(&replace_default_values(&tree))
}

pub fn variables(args: &MergeArgs, config: &ReconcilerConfig, sink: &OutputSink) -> Result<()> {
    let template = read_sequence(&args.template)?;
    let input_set = read_sequence(&args.input_set)?;
    let all_values = match &args.all_values {
        Some(path) => read_sequence(path)?,
        None => Vec::new(),
    };

    let merged = get_merged_variables(
        MergeVariables::new(&template, &input_set)
            .with_all_variables(&all_values)
            .with_default_values(args.use_default_values || config.merge.use_default_values)
            .with_identity_field(&config.merge.variable_identity_field),
    );
    sink.emit_tree(&Value::Array(merged))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport<'a> {
    raw: &'a str,
    qualifiers: &'a [Qualifier],
    info: MarkerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    strict_error: Option<String>,
}

pub fn inspect(args: &InspectArgs, sink: &OutputSink) -> Result<()> {
    let marker = RuntimeInput::parse(&args.marker).ok_or_else(|| {
        AppError::new(
            ErrorCategory::ValidationError,
            format!("'{}' is not a runtime input", args.marker),
        )
        .with_suggestion("Runtime inputs start with <+input>")
    })?;
    let strict_error = match args.marker.parse::<RuntimeInput>() {
        Ok(_) => None,
        Err(err) => {
            tracing::warn!("marker is only partially understood: {}", err);
            Some(err.to_string())
        }
    };

    let report = InspectReport {
        raw: marker.raw(),
        qualifiers: marker.qualifiers(),
        info: marker.info(),
        strict_error,
    };
    let mut rendered = serde_json::to_string_pretty(&report)?;
    rendered.push('\n');
    sink.emit_text(&rendered)
}

pub fn unresolved(args: &TreeFileArgs, sink: &OutputSink) -> Result<()> {
    let tree = FileUtils::read_tree(&args.file)?;
    let listing: String = collect_runtime_inputs(&tree)
        .iter()
        .map(|input| format!("{}\t{}\n", input.path, input.marker.raw()))
        .collect();
    sink.emit_text(&listing)
}

/// Saved input-set documents may wrap the pipeline as `inputSet: {pipeline: …}`.
fn input_set_portion(tree: Value) -> Value {
    let wrapped = tree
        .get(INPUT_SET_KEY)
        .and_then(|input_set| input_set.get(PIPELINE_KEY))
        .cloned();
    match wrapped {
        Some(pipeline) => {
            let mut portion = Map::new();
            portion.insert(PIPELINE_KEY.to_string(), pipeline);
            Value::Object(portion)
        }
        None => tree,
    }
}

fn read_optional(path: Option<&Path>) -> Result<Option<Value>> {
    match path {
        Some(path) => Ok(Some(FileUtils::read_tree(path)?)),
        None => Ok(None),
    }
}

fn read_sequence(path: &Path) -> Result<Vec<Value>> {
    match FileUtils::read_tree(path)? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        _ => Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("{} must hold a sequence of variables", path.display()),
        )
        .into()),
    }
}

fn empty_tree() -> Value {
    Value::Object(Map::new())
}
