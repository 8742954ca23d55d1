//! Extension-based language classification

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::constants::LANGUAGE_TABLE;

/// Extension of a file name, including the leading dot.
///
/// Leading dots of the name do not start an extension, so `.gitignore` has
/// none while `.env.example` has `.example`. Matching is case-sensitive.
pub fn file_extension(file_name: &str) -> Option<&str> {
    let dot = file_name.rfind('.')?;
    if file_name[..dot].chars().all(|c| c == '.') {
        return None;
    }
    Some(&file_name[dot..])
}

/// Language label for an extension; unmapped ones become `Unknown (<ext>)`
pub fn language_for_extension(extension: &str) -> Cow<'static, str> {
    LANGUAGE_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map_or_else(
            || Cow::Owned(format!("Unknown ({extension})")),
            |(_, language)| Cow::Borrowed(*language),
        )
}

/// Per-language file counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageStats(BTreeMap<String, usize>);

impl LanguageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one file by its relative path. Extensionless files are ignored.
    /// Returns the label the file was counted under.
    pub fn record_path(&mut self, relative_path: &str) -> Option<Cow<'static, str>> {
        let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        let extension = file_extension(file_name)?;
        let language = language_for_extension(extension);
        *self.0.entry(language.to_string()).or_insert(0) += 1;
        Some(language)
    }

    pub fn get(&self, language: &str) -> Option<usize> {
        self.0.get(language).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(language, count)| (language.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of files that landed in any bucket
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for LanguageStats {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
