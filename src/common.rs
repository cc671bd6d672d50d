use crate::ConvertError;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const ITEM_MODEL_PREFIX: &str = "minecraft:item/";

/// Splits `namespace:basename` and returns the basename.
/// Identifiers without a namespace are their own basename.
pub fn item_base_name(item_id: &str) -> &str {
    match item_id.split_once(':') {
        Some((_, base)) => base,
        None => item_id,
    }
}

pub fn item_model_ref(path: &str) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    format!("{ITEM_MODEL_PREFIX}{path}")
}

pub fn io_error(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> ConvertError {
    let path = path.into();
    move |source| ConvertError::Io { path, source }
}

pub fn write_pretty_json<T>(path: &Path, value: &T) -> Result<(), ConvertError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| ConvertError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_error(path))?;
    Ok(())
}
