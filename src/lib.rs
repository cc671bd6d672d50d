use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

pub mod cit;
pub mod common;
pub mod properties;
pub mod select_model;
pub mod walker;

pub use cit::{aggregate, CaseEntry, ItemGroups};
pub use properties::Declaration;
pub use select_model::{FallbackTable, SelectModelDocument};
pub use walker::TreeWalker;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Io error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Input {} is not a directory", .0.display())]
    InputNotDirectory(PathBuf),
    #[error("Could not serialize {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid fallback table {}", path.display())]
    FallbackTable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Order in which directory entries are visited. Case order in the generated
/// models follows it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum EntryOrder {
    /// Whatever the filesystem lists first.
    #[default]
    Native,
    /// By file name.
    Sorted,
}

/// How the `optifine` marker is looked for in a `cit` directory's parent path.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MarkerMatch {
    /// Anywhere in the path text, so `notoptifine/cit` matches too.
    #[default]
    Substring,
    /// Only as a whole path component.
    Segment,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub fallbacks: FallbackTable,
    pub order: EntryOrder,
    pub marker: MarkerMatch,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./input"),
            output: PathBuf::from("./output"),
            fallbacks: FallbackTable::default(),
            order: EntryOrder::default(),
            marker: MarkerMatch::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionReport {
    pub files_copied: usize,
    pub directories_created: usize,
    pub cit_directories: usize,
    pub declarations: usize,
    pub declarations_skipped: usize,
    pub models_written: usize,
    pub errors: usize,
}

impl ConversionReport {
    pub fn record_cit(&mut self, outcome: cit::CitOutcome) {
        self.cit_directories += 1;
        self.declarations += outcome.declarations;
        self.declarations_skipped += outcome.skipped;
        self.models_written += outcome.models_written;
        self.errors += outcome.errors;
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files copied, {} directories created, {} CIT directories, \
             {} declarations ({} skipped), {} models written, {} errors",
            self.files_copied,
            self.directories_created,
            self.cit_directories,
            self.declarations,
            self.declarations_skipped,
            self.models_written,
            self.errors
        )
    }
}

/// Converts the resource pack at `options.input` into `options.output`.
/// Only setup failures are returned; everything past that is logged and
/// counted in the report.
pub fn convert(options: &ConvertOptions) -> Result<ConversionReport, ConvertError> {
    ensure_input_dir(&options.input)?;
    std::fs::create_dir_all(&options.output).map_err(common::io_error(&options.output))?;

    let report = TreeWalker {
        input: &options.input,
        output: &options.output,
        order: options.order,
        marker: options.marker,
        fallbacks: &options.fallbacks,
    }
    .run();
    info!("Conversion completed successfully! {report}");
    Ok(report)
}

fn ensure_input_dir(input: &Path) -> Result<(), ConvertError> {
    let metadata = std::fs::metadata(input).map_err(common::io_error(input))?;
    if !metadata.is_dir() {
        return Err(ConvertError::InputNotDirectory(input.to_path_buf()));
    }
    Ok(())
}
