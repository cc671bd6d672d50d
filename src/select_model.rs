use crate::{
    cit::CaseEntry,
    common::{io_error, item_base_name, write_pretty_json, ITEM_MODEL_PREFIX},
    ConvertError,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

const SELECT_TYPE: &str = "minecraft:select";
const COMPONENT_PROPERTY: &str = "minecraft:component";
const CUSTOM_NAME_COMPONENT: &str = "minecraft:custom_name";
const MODEL_TYPE: &str = "minecraft:model";

/// Maps an item's base name to the model used when no case matches.
/// Names missing from the table fall back to `minecraft:item/<base name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    entries: IndexMap<String, String>,
}

impl Default for FallbackTable {
    fn default() -> Self {
        let entries = ["diamond_sword", "iron_hoe", "bow"]
            .into_iter()
            .map(|name| (name.to_owned(), format!("{ITEM_MODEL_PREFIX}{name}")))
            .collect();
        Self { entries }
    }
}

impl FallbackTable {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, base_name: impl Into<String>, model: impl Into<String>) {
        self.entries.insert(base_name.into(), model.into());
    }

    pub fn get(&self, base_name: &str) -> Option<&str> {
        self.entries.get(base_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, base_name: &str) -> String {
        match self.get(base_name) {
            Some(model) => model.to_owned(),
            None => format!("{ITEM_MODEL_PREFIX}{base_name}"),
        }
    }

    /// Layers a JSON object of `{"base_name": "model"}` over the current entries.
    pub fn extend_from_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let extra: IndexMap<String, String> = serde_json::from_str(json)?;
        self.extend(extra);
        Ok(())
    }

    /// Default table with the entries of a JSON file layered on top.
    pub fn from_json_file(path: &Path) -> Result<Self, ConvertError> {
        let json = std::fs::read_to_string(path).map_err(io_error(path))?;
        let mut table = Self::default();
        table
            .extend_from_json(&json)
            .map_err(|source| ConvertError::FallbackTable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(table)
    }
}

impl<K, V> Extend<(K, V)> for FallbackTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (base_name, model) in iter {
            self.insert(base_name, model);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelReference {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub model: String,
}

impl ModelReference {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            kind: MODEL_TYPE,
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectCase {
    pub when: String,
    pub model: ModelReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectModel {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub property: &'static str,
    pub component: &'static str,
    pub cases: Vec<SelectCase>,
    pub fallback: ModelReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectModelDocument {
    pub model: SelectModel,
}

impl SelectModelDocument {
    pub fn new(item_id: &str, cases: &[CaseEntry], fallbacks: &FallbackTable) -> Self {
        let cases = cases
            .iter()
            .map(|entry| SelectCase {
                when: entry.name.clone(),
                model: ModelReference::new(entry.model.clone()),
            })
            .collect();
        Self {
            model: SelectModel {
                kind: SELECT_TYPE,
                property: COMPONENT_PROPERTY,
                component: CUSTOM_NAME_COMPONENT,
                cases,
                fallback: ModelReference::new(fallbacks.resolve(item_base_name(item_id))),
            },
        }
    }
}

pub fn model_output_path(output_root: &Path, item_id: &str) -> PathBuf {
    output_root
        .join("assets")
        .join("minecraft")
        .join("models")
        .join("item")
        .join(format!("{}.json", item_base_name(item_id)))
}

pub fn write_select_model(
    output_root: &Path,
    item_id: &str,
    cases: &[CaseEntry],
    fallbacks: &FallbackTable,
) -> Result<PathBuf, ConvertError> {
    let document = SelectModelDocument::new(item_id, cases, fallbacks);
    let path = model_output_path(output_root, item_id);
    write_pretty_json(&path, &document)?;
    info!("Created model file for {item_id} at {}", path.display());
    Ok(path)
}
