use pipeline_reconciler::core::error::AppError;
use pipeline_reconciler::core::types::{ErrorCategory, ErrorSeverity};
use pipeline_reconciler::utils::FileUtils;
use std::path::Path;

#[test]
fn test_error_creation_all_categories() {
    let categories = vec![
        ErrorCategory::ValidationError,
        ErrorCategory::SerializationError,
        ErrorCategory::IoError,
        ErrorCategory::ConfigError,
        ErrorCategory::InternalError,
        ErrorCategory::Unknown,
    ];

    for category in categories {
        let error = AppError::new(category, "test message");
        assert_eq!(error.category, category);
        assert_eq!(error.message, "test message");
        assert_eq!(error.context.len(), 0);
        assert_eq!(error.recovery_suggestions.len(), 0);
        assert!(error.occurred_at <= chrono::Utc::now());
        assert!(error.source.is_none());
        assert!(error.code.starts_with("ERR-"));
    }
}

#[test]
fn test_error_severity_mapping() {
    let test_cases = vec![
        (ErrorCategory::ValidationError, ErrorSeverity::Error),
        (ErrorCategory::SerializationError, ErrorSeverity::Error),
        (ErrorCategory::IoError, ErrorSeverity::Error),
        (ErrorCategory::ConfigError, ErrorSeverity::Error),
        (ErrorCategory::InternalError, ErrorSeverity::Error),
        (ErrorCategory::Unknown, ErrorSeverity::Info),
    ];

    for (category, expected_severity) in test_cases {
        let error = AppError::new(category, "test");
        assert_eq!(error.severity(), expected_severity);
    }
}

#[test]
fn test_error_display() {
    let mut error =
        AppError::new(ErrorCategory::ConfigError, "invalid config").with_code("RCN-CFG-002");
    error.add_context("field", "variable_identity_field");

    let display = format!("{}", error);
    assert!(display.contains("RCN-CFG-002"));
    assert!(display.contains("ConfigError"));
    assert!(display.contains("invalid config"));
    assert!(display.contains("variable_identity_field"));
}

#[test]
fn test_error_display_with_source() {
    let source = std::io::Error::new(std::io::ErrorKind::Other, "underlying error");
    let error = AppError::with_source(
        ErrorCategory::InternalError,
        "wrapper error",
        Box::new(source),
    );

    let display = format!("{}", error);
    assert!(display.contains("wrapper error"));
    assert!(display.contains("underlying error"));
}

#[test]
fn test_error_from_anyhow() {
    let app_error = AppError::from(anyhow::anyhow!("anyhow error message"));

    assert_eq!(app_error.category, ErrorCategory::InternalError);
    assert_eq!(app_error.message, "anyhow error message");
    assert_eq!(app_error.severity(), ErrorSeverity::Error);
}

#[test]
fn test_error_from_io_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
    let app_error = AppError::from(io_error);

    assert_eq!(app_error.category, ErrorCategory::IoError);
    assert_eq!(app_error.message, "permission denied");
    assert_eq!(
        app_error.recovery_suggestions,
        vec!["Check file permissions and paths".to_string()]
    );
}

#[test]
fn test_missing_tree_file_reports_read_code() {
    let err = FileUtils::read_tree(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert_eq!(err.category, ErrorCategory::IoError);
    assert_eq!(err.code, "RCN-IO-001");
}

#[test]
fn test_app_error_survives_anyhow_round_trip() {
    let original = AppError::new(ErrorCategory::SerializationError, "bad yaml").with_code("RCN-SER-001");
    let wrapped: anyhow::Error = original.into();
    let recovered = wrapped.downcast_ref::<AppError>().unwrap();
    assert_eq!(recovered.code, "RCN-SER-001");
}
