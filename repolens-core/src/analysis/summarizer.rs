//! README excerpt and key-file selection

use repolens_utils::truncate_with_marker;

use crate::constants::{KEY_FILES, README_EXCERPT_CHARS, README_PATH, TRUNCATION_MARKER};
use crate::models::{FileEntry, LanguageStats, RepoInfo};

/// First file whose relative path is `README.md`, ignoring case
pub fn find_readme(files: &[FileEntry]) -> Option<&FileEntry> {
    files
        .iter()
        .find(|file| file.path.eq_ignore_ascii_case(README_PATH))
}

/// First 500 characters of the README, with a marker when cut
pub fn readme_excerpt(readme: &str) -> String {
    truncate_with_marker(readme, README_EXCERPT_CHARS, TRUNCATION_MARKER)
}

pub fn is_key_file(relative_path: &str) -> bool {
    KEY_FILES.contains(&relative_path)
}

/// Indices of key files, in the order given
pub fn select_key_files<'a, I>(paths: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .enumerate()
        .filter_map(|(idx, path)| is_key_file(path).then_some(idx))
        .collect()
}

/// Build the compact repository record. Returns it together with the
/// key-file indices into `files`.
pub fn summarize(files: &[FileEntry], languages: &LanguageStats) -> (RepoInfo, Vec<usize>) {
    let readme = find_readme(files).and_then(FileEntry::text).unwrap_or_default();
    let key_files = select_key_files(files.iter().map(|f| f.path.as_str()));

    let repo_info = RepoInfo {
        total_files: files.len(),
        languages: languages.clone(),
        has_readme: !readme.is_empty(),
        readme_sample: readme_excerpt(readme),
        key_files: key_files.iter().map(|&idx| files[idx].path.clone()).collect(),
    };
    (repo_info, key_files)
}
