#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, TreeFormat};
use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

pub trait Serializer {
    fn serialize<T: serde::Serialize>(&self, data: &T) -> Result<Vec<u8>>;
    fn deserialize<T: serde::de::DeserializeOwned>(&self, data: &[u8]) -> Result<T>;
}

/// Pretty-printed JSON with a trailing newline.
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<T: serde::Serialize>(&self, data: &T) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(data)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        serde_json::from_slice(data).map_err(Into::into)
    }
}

pub struct YamlSerializer;

impl Serializer for YamlSerializer {
    fn serialize<T: serde::Serialize>(&self, data: &T) -> Result<Vec<u8>> {
        serde_yaml::to_string(data)
            .map(String::into_bytes)
            .map_err(Into::into)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        serde_yaml::from_slice(data).map_err(Into::into)
    }
}

/// Render a tree in the requested format.
pub fn render_tree(tree: &Value, format: TreeFormat) -> Result<String, AppError> {
    let bytes = match format {
        TreeFormat::Json => JsonSerializer.serialize(tree),
        TreeFormat::Yaml => YamlSerializer.serialize(tree),
    }
    .map_err(|e| {
        AppError::new(
            ErrorCategory::SerializationError,
            format!("Failed to serialize tree as {}: {}", format, e),
        )
        .with_code("RCN-SER-002")
    })?;
    String::from_utf8(bytes).map_err(|e| {
        AppError::new(ErrorCategory::SerializationError, e.to_string()).with_code("RCN-SER-002")
    })
}

/// Parse a tree from text in the given format.
pub fn parse_tree(text: &str, format: TreeFormat) -> Result<Value, AppError> {
    let parsed: Result<Value> = match format {
        TreeFormat::Json => JsonSerializer.deserialize(text.as_bytes()),
        TreeFormat::Yaml => YamlSerializer.deserialize(text.as_bytes()),
    };
    parsed.map_err(|e| {
        AppError::new(
            ErrorCategory::SerializationError,
            format!("Failed to parse {}: {}", format, e),
        )
        .with_code("RCN-SER-001")
    })
}

pub trait FileSerializer {
    fn save_to_file<T, S: Serializer>(&self, path: &Path, data: &T, serializer: &S) -> Result<()>
    where
        T: Serialize;
    fn load_from_file<T, S: Serializer>(&self, path: &Path, serializer: &S) -> Result<T>
    where
        T: DeserializeOwned;
}

pub struct FileUtils;

impl FileSerializer for FileUtils {
    fn save_to_file<T, S: Serializer>(&self, path: &Path, data: &T, serializer: &S) -> Result<()>
    where
        T: serde::Serialize,
    {
        let content = serializer.serialize(data)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&content)?;
        Ok(())
    }

    fn load_from_file<T, S: Serializer>(&self, path: &Path, serializer: &S) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut file = fs::File::open(path)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        serializer.deserialize(&content)
    }
}

impl FileUtils {
    /// Read a pipeline tree, picking JSON or YAML from the file extension.
    pub fn read_tree(path: &Path) -> Result<Value, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read {}: {}", path.display(), e),
            )
            .with_code("RCN-IO-001")
        })?;
        parse_tree(&text, TreeFormat::from_path(path)).map_err(|mut err| {
            err.add_context("path", &path.display().to_string());
            err
        })
    }

    /// Write a tree to `path` in `format`.
    pub fn write_tree(path: &Path, tree: &Value, format: TreeFormat) -> Result<(), AppError> {
        let rendered = render_tree(tree, format)?;
        fs::write(path, rendered).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to write {}: {}", path.display(), e),
            )
            .with_code("RCN-IO-002")
        })
    }
}
