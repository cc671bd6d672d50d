use crate::{
    common::item_model_ref,
    properties::{declaration_stem, read_declaration, Declaration},
    select_model::{write_select_model, FallbackTable},
    EntryOrder,
};
use indexmap::IndexMap;
use std::{fs, io, path::Path};
use tracing::{debug, error, info};

/// One `when`/`model` pair of a select model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseEntry {
    pub name: String,
    pub model: String,
}

impl CaseEntry {
    pub fn from_declaration(declaration: &Declaration) -> Self {
        Self {
            name: declaration.case_name().to_owned(),
            model: item_model_ref(&declaration.model),
        }
    }
}

/// Item identifier to its cases, both in first-seen order.
pub type ItemGroups = IndexMap<String, Vec<CaseEntry>>;

/// Groups declarations by target item. Every identifier of every declaration
/// contributes one case, so repeated identifiers repeat their case.
pub fn aggregate<'a, I>(declarations: I) -> ItemGroups
where
    I: IntoIterator<Item = &'a Declaration>,
{
    let mut groups = ItemGroups::new();
    for declaration in declarations {
        let entry = CaseEntry::from_declaration(declaration);
        for item_id in declaration.item_ids() {
            groups
                .entry(item_id.to_owned())
                .or_default()
                .push(entry.clone());
        }
    }
    groups
}

/// Parses the `.properties` files directly inside `dir`. Subdirectories are
/// not searched. Returns the accepted declarations and the number of files
/// that were skipped.
pub fn collect_declarations(
    dir: &Path,
    order: EntryOrder,
) -> io::Result<(Vec<Declaration>, usize)> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    if order == EntryOrder::Sorted {
        entries.sort_by_key(|entry| entry.file_name());
    }
    let mut declarations = Vec::new();
    let mut skipped = 0;
    for entry in entries {
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if declaration_stem(&file_name).is_none() {
            continue;
        }
        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                error!("Could not stat {}: {e}", entry.path().display());
                skipped += 1;
                continue;
            }
        }
        match read_declaration(&entry.path()) {
            Some(declaration) => declarations.push(declaration),
            None => skipped += 1,
        }
    }
    Ok((declarations, skipped))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CitOutcome {
    pub declarations: usize,
    pub skipped: usize,
    pub models_written: usize,
    pub errors: usize,
}

/// Converts one CIT directory into select model files under `output_root`.
pub fn process_cit_directory(
    dir: &Path,
    output_root: &Path,
    order: EntryOrder,
    fallbacks: &FallbackTable,
) -> CitOutcome {
    let mut outcome = CitOutcome::default();
    let (declarations, skipped) = match collect_declarations(dir, order) {
        Ok(found) => found,
        Err(e) => {
            error!("Could not read CIT directory {}: {e}", dir.display());
            outcome.errors += 1;
            return outcome;
        }
    };
    outcome.declarations = declarations.len();
    outcome.skipped = skipped;
    if declarations.is_empty() {
        debug!("No item declarations in {}", dir.display());
        return outcome;
    }

    let groups = aggregate(&declarations);
    info!(
        "{}: {} declarations for {} items",
        dir.display(),
        declarations.len(),
        groups.len()
    );
    for (item_id, cases) in &groups {
        match write_select_model(output_root, item_id, cases, fallbacks) {
            Ok(_) => outcome.models_written += 1,
            Err(e) => {
                error!("Could not write model for {item_id}: {e}");
                outcome.errors += 1;
            }
        }
    }
    outcome
}
