use std::{collections::HashMap, path::Path};
use tracing::{debug, warn};

pub const DECLARATION_EXTENSION: &str = ".properties";
const DISPLAY_NAME_KEY: &str = "nbt.display.Name";
const IPATTERN_PREFIX: &str = "ipattern:";

pub type Properties = HashMap<String, String>;

/// Reads `key=value` lines. Blank lines and `#` comments are skipped, the first
/// `=` separates key from value, and pairs with an empty side are dropped.
/// Later keys overwrite earlier ones.
pub fn parse_properties(text: &str) -> Properties {
    let mut properties = Properties::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if !key.is_empty() && !value.is_empty() {
            properties.insert(key.to_owned(), value.to_owned());
        }
    }
    properties
}

/// One `type=item` CIT rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub items: String,
    pub texture: String,
    pub model: String,
    pub display_name: Option<String>,
}

impl Declaration {
    /// `file_stem` is the declaration's file name without `.properties`, used
    /// when no `texture` key is given.
    pub fn parse(text: &str, file_stem: &str) -> Option<Self> {
        Self::from_properties(parse_properties(text), file_stem)
    }

    pub fn from_properties(mut properties: Properties, file_stem: &str) -> Option<Self> {
        if properties.get("type").map(String::as_str) != Some("item") {
            return None;
        }
        let items = properties.remove("items")?;
        let texture = properties
            .remove("texture")
            .unwrap_or_else(|| file_stem.to_owned());
        let model = properties
            .remove("model")
            .unwrap_or_else(|| texture.clone());
        let display_name = properties.remove(DISPLAY_NAME_KEY).map(|name| {
            name.strip_prefix(IPATTERN_PREFIX)
                .map(str::to_owned)
                .unwrap_or(name)
        });
        Some(Self {
            items,
            texture,
            model,
            display_name,
        })
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.split(' ').filter(|id| !id.is_empty())
    }

    /// The custom name a case should match: the display name when one is set,
    /// otherwise the texture name.
    pub fn case_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.texture,
        }
    }
}

pub fn declaration_stem(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(DECLARATION_EXTENSION)
}

/// Reads and parses a declaration file. Unreadable files are logged and
/// treated the same as invalid ones.
pub fn read_declaration(path: &Path) -> Option<Declaration> {
    let file_name = path.file_name()?.to_string_lossy();
    let stem = declaration_stem(&file_name).unwrap_or(&*file_name);
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error parsing properties file {}: {e}", path.display());
            return None;
        }
    };
    let declaration = Declaration::parse(&text, stem);
    if declaration.is_none() {
        debug!("Skipping {}: not a type=item declaration", path.display());
    }
    declaration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_blank_lines_and_empty_sides() {
        let props = parse_properties(
            "# comment\n\n  type = item \nitems=\n=orphan\nno_separator\r\ntexture=a=b\n",
        );
        assert_eq!(props.len(), 2);
        assert_eq!(props["type"], "item");
        assert_eq!(props["texture"], "a=b");
    }

    #[test]
    fn later_keys_win() {
        let props = parse_properties("texture=first\ntexture=second");
        assert_eq!(props["texture"], "second");
    }

    #[test]
    fn requires_item_type_and_items() {
        assert!(Declaration::parse("type=item\nitems=minecraft:bow", "x").is_some());
        assert!(Declaration::parse("type=armor\nitems=minecraft:bow", "x").is_none());
        assert!(Declaration::parse("items=minecraft:bow", "x").is_none());
        assert!(Declaration::parse("type=item\nitems=", "x").is_none());
        assert!(Declaration::parse("", "x").is_none());
    }

    #[test]
    fn texture_and_model_defaults() {
        let decl = Declaration::parse("type=item\nitems=minecraft:bow", "ruby_bow").unwrap();
        assert_eq!(decl.texture, "ruby_bow");
        assert_eq!(decl.model, "ruby_bow");
        assert_eq!(decl.case_name(), "ruby_bow");

        let decl = Declaration::parse(
            "type=item\nitems=minecraft:bow\ntexture=tex\nmodel=./models/bow",
            "ruby_bow",
        )
        .unwrap();
        assert_eq!(decl.texture, "tex");
        assert_eq!(decl.model, "./models/bow");
    }

    #[test]
    fn display_name_drops_ipattern_marker() {
        let decl = Declaration::parse(
            "type=item\nitems=minecraft:diamond_sword\nnbt.display.Name=ipattern:Ruby Sword",
            "ruby_sword",
        )
        .unwrap();
        assert_eq!(decl.display_name.as_deref(), Some("Ruby Sword"));
        assert_eq!(decl.case_name(), "Ruby Sword");

        let decl = Declaration::parse(
            "type=item\nitems=minecraft:bow\nnbt.display.Name=Plain",
            "x",
        )
        .unwrap();
        assert_eq!(decl.case_name(), "Plain");
    }

    #[test]
    fn empty_display_name_after_marker_falls_back_to_texture() {
        let decl = Declaration::parse(
            "type=item\nitems=minecraft:bow\ntexture=t\nnbt.display.Name=ipattern:",
            "x",
        )
        .unwrap();
        assert_eq!(decl.case_name(), "t");
    }

    #[test]
    fn item_ids_keep_duplicates_and_skip_gaps() {
        let decl = Declaration::parse(
            "type=item\nitems=minecraft:bow  minecraft:stick minecraft:bow",
            "x",
        )
        .unwrap();
        let ids: Vec<_> = decl.item_ids().collect();
        assert_eq!(ids, ["minecraft:bow", "minecraft:stick", "minecraft:bow"]);
    }

    #[test]
    fn unreadable_file_is_absent() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(read_declaration(&dir.path().join("missing.properties")).is_none());
    }

    #[test]
    fn reads_stem_from_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ruby_sword.properties");
        std::fs::write(&path, "type=item\nitems=minecraft:diamond_sword\n").unwrap();
        let decl = read_declaration(&path).unwrap();
        assert_eq!(decl.texture, "ruby_sword");
    }
}
