use clap::Parser;
use pipeline_reconciler::cli::{self, Args};
use pipeline_reconciler::core::error::AppError;
use pipeline_reconciler::logging;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    let workspace = env::current_dir().ok();
    let _guard = match logging::init(workspace.as_deref(), args.output.is_none()) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {:#}", err);
            None
        }
    };

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<AppError>() {
        Some(app_error) => {
            tracing::error!(code = %app_error.code, "{}", app_error.message);
            eprintln!("error: {}", app_error);
            for suggestion in &app_error.recovery_suggestions {
                eprintln!("  hint: {}", suggestion);
            }
        }
        None => {
            tracing::error!("{:#}", err);
            eprintln!("error: {:#}", err);
        }
    }
}
