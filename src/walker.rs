use crate::{
    cit::process_cit_directory, select_model::FallbackTable, ConversionReport, EntryOrder,
    MarkerMatch,
};
use std::{ffi::OsStr, fs, path::Path};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

pub const CIT_DIR_NAME: &str = "cit";
pub const OPTIFINE_MARKER: &str = "optifine";

/// Whether a directory named `name`, whose parent sits at `relative_parent`
/// below the input root, holds CIT declarations.
pub fn is_cit_directory(relative_parent: &Path, name: &OsStr, marker: MarkerMatch) -> bool {
    if name != CIT_DIR_NAME {
        return false;
    }
    match marker {
        MarkerMatch::Substring => relative_parent
            .to_string_lossy()
            .contains(OPTIFINE_MARKER),
        MarkerMatch::Segment => relative_parent
            .components()
            .any(|component| component.as_os_str() == OPTIFINE_MARKER),
    }
}

pub struct TreeWalker<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub order: EntryOrder,
    pub marker: MarkerMatch,
    pub fallbacks: &'a FallbackTable,
}

impl TreeWalker<'_> {
    /// Mirrors `input` into `output`. CIT directories are converted instead of
    /// copied. Failures are logged and counted, never returned.
    pub fn run(&self) -> ConversionReport {
        let mut report = ConversionReport::default();
        let mut walker = WalkDir::new(self.input).min_depth(1);
        if self.order == EntryOrder::Sorted {
            walker = walker.sort_by_file_name();
        }
        // The output may live inside the input; never mirror it into itself.
        let output_root = fs::canonicalize(self.output).ok();
        let mut entries = walker.into_iter();
        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("Error walking input: {e}");
                    report.errors += 1;
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(self.input) else {
                error!("{} is outside the input root", entry.path().display());
                report.errors += 1;
                continue;
            };
            let target = self.output.join(relative);

            if entry.file_type().is_dir() {
                if output_root.is_some() && fs::canonicalize(entry.path()).ok() == output_root {
                    entries.skip_current_dir();
                    debug!("Skipping output directory {}", entry.path().display());
                    continue;
                }
                let relative_parent = relative.parent().unwrap_or(Path::new(""));
                if is_cit_directory(relative_parent, entry.file_name(), self.marker) {
                    entries.skip_current_dir();
                    info!("Converting CIT directory {}", entry.path().display());
                    let outcome = process_cit_directory(
                        entry.path(),
                        self.output,
                        self.order,
                        self.fallbacks,
                    );
                    report.record_cit(outcome);
                    continue;
                }
                match fs::create_dir_all(&target) {
                    Ok(()) => report.directories_created += 1,
                    Err(e) => {
                        error!("Could not create directory {}: {e}", target.display());
                        report.errors += 1;
                    }
                }
            } else if entry.path().is_file() {
                match fs::copy(entry.path(), &target) {
                    Ok(_) => {
                        debug!("Copied {}", relative.display());
                        report.files_copied += 1;
                    }
                    Err(e) => {
                        error!(
                            "Could not copy {} to {}: {e}",
                            entry.path().display(),
                            target.display()
                        );
                        report.errors += 1;
                    }
                }
            } else {
                warn!("Skipping {}: not a regular file", entry.path().display());
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cit_detection_is_a_loose_substring_match() {
        let loose = |parent: &str, name: &str| {
            is_cit_directory(Path::new(parent), OsStr::new(name), MarkerMatch::Substring)
        };
        assert!(loose("assets/minecraft/optifine", "cit"));
        assert!(loose("assets/notoptifine_stuff", "cit"));
        assert!(!loose("assets/minecraft", "cit"));
        assert!(!loose("", "cit"));
        assert!(!loose("assets/minecraft/optifine", "cit2"));
    }

    #[test]
    fn segment_match_requires_a_whole_component() {
        let strict = |parent: &str| {
            is_cit_directory(Path::new(parent), OsStr::new("cit"), MarkerMatch::Segment)
        };
        assert!(strict("assets/minecraft/optifine"));
        assert!(strict("optifine/extra"));
        assert!(!strict("assets/notoptifine_stuff"));
    }

    #[test]
    fn cit_directory_is_not_mirrored() {
        let input = tempfile::TempDir::new().unwrap();
        let output = tempfile::TempDir::new().unwrap();
        let cit = input.path().join("assets/minecraft/optifine/cit");
        fs::create_dir_all(&cit).unwrap();
        fs::write(cit.join("bow.properties"), "type=item\nitems=minecraft:bow").unwrap();
        fs::write(cit.join("bow.png"), [1u8, 2, 3]).unwrap();
        fs::write(input.path().join("pack.mcmeta"), "{}").unwrap();

        let fallbacks = FallbackTable::default();
        let report = TreeWalker {
            input: input.path(),
            output: output.path(),
            order: EntryOrder::Sorted,
            marker: MarkerMatch::Substring,
            fallbacks: &fallbacks,
        }
        .run();

        assert!(!output.path().join("assets/minecraft/optifine/cit").exists());
        assert!(output.path().join("assets/minecraft/optifine").is_dir());
        assert!(output.path().join("assets/minecraft/models/item/bow.json").is_file());
        assert_eq!(fs::read(output.path().join("pack.mcmeta")).unwrap(), b"{}");
        assert_eq!(report.cit_directories, 1);
        assert_eq!(report.models_written, 1);
        assert_eq!(report.files_copied, 1);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn output_nested_in_input_is_not_mirrored() {
        let input = tempfile::TempDir::new().unwrap();
        fs::write(input.path().join("pack.mcmeta"), "{}").unwrap();
        fs::create_dir(input.path().join("assets")).unwrap();
        fs::write(input.path().join("assets/a.png"), [7u8]).unwrap();
        let output = input.path().join("out");
        fs::create_dir(&output).unwrap();

        let fallbacks = FallbackTable::default();
        let report = TreeWalker {
            input: input.path(),
            output: &output,
            order: EntryOrder::Sorted,
            marker: MarkerMatch::Substring,
            fallbacks: &fallbacks,
        }
        .run();

        assert_eq!(report.files_copied, 2);
        assert_eq!(report.directories_created, 1);
        assert_eq!(report.errors, 0);
        assert!(output.join("assets/a.png").is_file());
        assert!(!output.join("out").exists());
    }
}
