//! Key/value metadata that travels next to a source asset as a sidecar file.
//!
//! The sidecar format is plain text with one `key=value` pair per line. Empty
//! lines and lines starting with `:` (section headers) are ignored, as is any
//! line without a separator or with the separator in the final position. The
//! forgiving parse is deliberate so that a hand-edited sidecar never blocks
//! the pipeline; a missing or garbled line simply falls back to the encoder's
//! default for that key.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufRead, BufReader},
    path::Path,
};

use crate::common::{Error, Result};

/// Reserved key under which every encoder stores its schema version.
pub const VERSION_KEY: &str = "version";

const SEPARATOR: char = '=';
const SECTION_MARKER: char = ':';

/// Types that can be stored in a [`MetaTable`].
pub trait MetaValue {
    fn to_setting(&self) -> String;
}

impl MetaValue for &str {
    fn to_setting(&self) -> String {
        (*self).to_owned()
    }
}

impl MetaValue for String {
    fn to_setting(&self) -> String {
        self.clone()
    }
}

impl MetaValue for f32 {
    fn to_setting(&self) -> String {
        self.to_string()
    }
}

impl MetaValue for i32 {
    fn to_setting(&self) -> String {
        self.to_string()
    }
}

impl MetaValue for u32 {
    fn to_setting(&self) -> String {
        self.to_string()
    }
}

impl MetaValue for bool {
    fn to_setting(&self) -> String {
        if *self { "on" } else { "off" }.to_owned()
    }
}

/// Ordered string-keyed settings table with typed accessors.
///
/// Values are stored as text; the typed getters derive their result from the
/// stored string on every read. Equality is full map equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaTable {
    settings: BTreeMap<String, String>,
}

impl MetaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the table from a sidecar file, merging into the current entries.
    /// Later occurrences of a key overwrite earlier ones. Fails only when the
    /// file cannot be opened or read; malformed lines are skipped silently.
    ///
    /// # Example
    ///
    /// ```
    /// # let dir = tempdir::TempDir::new("meta_table").unwrap();
    /// # let path = dir.path().join("hero.obj.meta");
    /// # std::fs::write(&path, ":header\nname=Hero\nscale=2.5\n").unwrap();
    /// use forge_content::MetaTable;
    /// let mut table = MetaTable::new();
    /// table.load(&path).unwrap();
    /// assert_eq!(table.get_string("name"), "Hero");
    /// ```
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path.as_ref())?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');

            if line.is_empty() || line.starts_with(SECTION_MARKER) {
                continue;
            }

            // A line is only an entry when the separator exists and is not the
            // final character.
            let Some(pos) = line.find(SEPARATOR) else {
                continue;
            };
            if pos == line.len() - 1 {
                continue;
            }

            let key = &line[..pos];
            let value = &line[pos + 1..];
            self.settings.insert(key.to_owned(), value.to_owned());
        }
        Ok(())
    }

    /// Writes one `key=value` line per entry. Fails when the destination
    /// cannot be opened for writing.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut content = String::new();
        for (key, value) in &self.settings {
            content.push_str(key);
            content.push(SEPARATOR);
            content.push_str(value);
            content.push('\n');
        }
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn has_setting(&self, setting: &str) -> bool {
        self.settings.contains_key(setting)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Returns the stored text, or an empty string when the key is absent.
    pub fn get_string(&self, setting: &str) -> String {
        self.settings.get(setting).cloned().unwrap_or_default()
    }

    /// Returns the stored value as a float, 0.0 when the key is absent, or
    /// [`Error::Parse`] when the stored text is no float.
    pub fn get_float(&self, setting: &str) -> Result<f32> {
        match self.settings.get(setting) {
            None => Ok(0.0),
            Some(value) => value.parse().map_err(|_| Error::Parse {
                key: setting.to_owned(),
                value: value.clone(),
            }),
        }
    }

    /// Returns the stored value as an integer, 0 when the key is absent, or
    /// [`Error::Parse`] when the stored text is no integer.
    pub fn get_int(&self, setting: &str) -> Result<i32> {
        match self.settings.get(setting) {
            None => Ok(0),
            Some(value) => value.parse().map_err(|_| Error::Parse {
                key: setting.to_owned(),
                value: value.clone(),
            }),
        }
    }

    /// Returns true when the stored value is "1", "on" or "true" (case-insensitive),
    /// false for any other text and for an absent key.
    pub fn get_bool(&self, setting: &str) -> bool {
        match self.settings.get(setting) {
            None => false,
            Some(value) => value == "1" || value.eq_ignore_ascii_case("on") || value.eq_ignore_ascii_case("true"),
        }
    }

    /// Returns the schema version stored under [`VERSION_KEY`], 0 when the
    /// table was never touched by an encoder.
    pub fn version(&self) -> Result<u32> {
        match self.settings.get(VERSION_KEY) {
            None => Ok(0),
            Some(value) => value.parse().map_err(|_| Error::Parse {
                key: VERSION_KEY.to_owned(),
                value: value.clone(),
            }),
        }
    }

    /// Sets the value, overwriting any previous one.
    pub fn set_value(&mut self, setting: impl Into<String>, value: impl MetaValue) {
        self.settings.insert(setting.into(), value.to_setting());
    }

    /// Sets the value only when the key is absent.
    pub fn set_default_value(&mut self, setting: impl Into<String>, value: impl MetaValue) {
        let setting = setting.into();
        if !self.has_setting(&setting) {
            self.settings.insert(setting, value.to_setting());
        }
    }

    /// Removes the entry. Used by schema migrations that retire a key.
    pub fn remove(&mut self, setting: &str) -> bool {
        self.settings.remove(setting).is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempdir::TempDir;

    use super::*;

    #[test]
    fn load_skips_sections_and_malformed_lines() {
        let root = TempDir::new("meta_table").unwrap();
        let path = root.path().join("hero.obj.meta");
        fs::write(&path, ":header\nname=Hero\nscale=2.5\n").unwrap();

        let mut table = MetaTable::new();
        table.load(&path).unwrap();
        assert_eq!(table.get_string("name"), "Hero");
        assert_eq!(table.get_float("scale").unwrap(), 2.5);
        assert!(!table.has_setting("missing"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn malformed_lines_are_not_an_error() {
        let root = TempDir::new("meta_table").unwrap();
        let path = root.path().join("junk.meta");
        fs::write(&path, "no separator\ntrailing=\n\nvalid=1\n").unwrap();

        let mut table = MetaTable::new();
        table.load(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_string("valid"), "1");
    }

    #[test]
    fn later_occurrences_overwrite() {
        let root = TempDir::new("meta_table").unwrap();
        let path = root.path().join("twice.meta");
        fs::write(&path, "key=first\nkey=second\n").unwrap();

        let mut table = MetaTable::new();
        table.load(&path).unwrap();
        assert_eq!(table.get_string("key"), "second");
    }

    #[test]
    fn load_fails_when_file_is_missing() {
        let mut table = MetaTable::new();
        assert!(matches!(table.load("does/not/exist.meta"), Err(Error::Io(_))));
    }

    #[test]
    fn absent_keys_return_zero_values() {
        let table = MetaTable::new();
        assert_eq!(table.get_string("missing"), "");
        assert_eq!(table.get_float("missing").unwrap(), 0.0);
        assert_eq!(table.get_int("missing").unwrap(), 0);
        assert!(!table.get_bool("missing"));
    }

    #[test]
    fn unparsable_numbers_are_a_parse_error() {
        let mut table = MetaTable::new();
        table.set_value("scale", "enormous");
        assert!(matches!(table.get_float("scale"), Err(Error::Parse { .. })));
        assert!(matches!(table.get_int("scale"), Err(Error::Parse { .. })));
    }

    #[test]
    fn bool_spellings() {
        let mut table = MetaTable::new();
        table.set_value("a", "1");
        table.set_value("b", "On");
        table.set_value("c", "TRUE");
        table.set_value("d", "yes");
        table.set_value("e", false);
        assert!(table.get_bool("a"));
        assert!(table.get_bool("b"));
        assert!(table.get_bool("c"));
        assert!(!table.get_bool("d"));
        assert!(!table.get_bool("e"));
        assert_eq!(table.get_string("e"), "off");
    }

    #[test]
    fn set_default_value_does_not_overwrite() {
        let mut table = MetaTable::new();
        table.set_value("key", "original");
        table.set_default_value("key", "default");
        table.set_default_value("other", "default");
        assert_eq!(table.get_string("key"), "original");
        assert_eq!(table.get_string("other"), "default");
    }

    #[test]
    fn save_load_round_trip() {
        let root = TempDir::new("meta_table").unwrap();
        let path = root.path().join("round_trip.meta");

        let mut table = MetaTable::new();
        table.set_value("generate_normals", true);
        table.set_value("uniform_scale", 2.5f32);
        table.set_value("name", "Hero");
        table.set_value(VERSION_KEY, 2u32);
        table.save(&path).unwrap();

        let mut reloaded = MetaTable::new();
        reloaded.load(&path).unwrap();
        assert_eq!(table, reloaded);
        assert_eq!(reloaded.version().unwrap(), 2);
    }

    #[test]
    fn version_of_untouched_table_is_zero() {
        assert_eq!(MetaTable::new().version().unwrap(), 0);
    }
}
