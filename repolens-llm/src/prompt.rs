//! Prompt composition
//!
//! Both prompts are plain strings with text cut at fixed character counts.
//! The wording and the cut points are part of what the completion service
//! sees, so they stay stable.

use repolens_core::constants::TRUNCATION_MARKER;
use repolens_core::{CacheEntry, LanguageStats, RepositoryProfile};
use repolens_utils::char_prefix;
use std::fmt::Write as _;

/// Key files whose contents are quoted in the analysis prompt
pub const MAX_PROMPT_KEY_FILES: usize = 3;

/// Characters quoted from each key file
pub const KEY_FILE_EXCERPT_CHARS: usize = 1000;

/// Characters of pretty-printed structure JSON quoted in the question prompt
pub const STRUCTURE_EXCERPT_CHARS: usize = 1000;

/// Render language counts as `{'Python': 2, 'Markdown': 1}`
pub fn render_languages(languages: &LanguageStats) -> String {
    let body: Vec<String> = languages
        .iter()
        .map(|(language, count)| format!("'{language}': {count}"))
        .collect();
    format!("{{{}}}", body.join(", "))
}

/// Replace every non-ASCII character of serialized JSON with `\uXXXX`
/// escapes (UTF-16 surrogate pairs above the BMP), so the quoted text and its
/// cut point are the same as for ASCII-only JSON encoders
fn escape_non_ascii(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(escaped, "\\u{unit:04x}");
            }
        }
    }
    escaped
}

/// Prompt asking for a markdown summary of a freshly analyzed repository
pub fn analysis_prompt(profile: &RepositoryProfile) -> String {
    let info = profile.repo_info();

    let mut file_contents = String::new();
    for key_file in profile.key_files().take(MAX_PROMPT_KEY_FILES) {
        if let Some(text) = key_file.text() {
            let _ = write!(
                file_contents,
                "\n\nFile: {}\n```\n{}{}\n```",
                key_file.path,
                char_prefix(text, KEY_FILE_EXCERPT_CHARS),
                TRUNCATION_MARKER
            );
        }
    }

    format!(
        "Analyze this GitHub repository and provide a summary:\n\
         \n\
         Repository Statistics:\n\
         - Total Files: {total}\n\
         - Languages: {languages}\n\
         \n\
         README Content:\n\
         {readme}\n\
         \n\
         Key Files:{file_contents}\n\
         \n\
         Provide a concise summary of what this repository is about, its main features, \
         and technologies used. Format the response with markdown.\n",
        total = info.total_files,
        languages = render_languages(&info.languages),
        readme = info.readme_sample,
    )
}

/// Prompt answering `question` about a repository that was analyzed before
pub fn question_prompt(entry: &CacheEntry, question: &str) -> String {
    // Serializing a tree of strings cannot fail
    let structure =
        escape_non_ascii(&serde_json::to_string_pretty(&entry.structure).unwrap_or_default());

    format!(
        "You're answering questions about a GitHub repository with the following details:\n\
         \n\
         Repository Summary:\n\
         {summary}\n\
         \n\
         Repository Stats:\n\
         - Total Files: {total}\n\
         - Languages: {languages}\n\
         \n\
         File Structure:\n\
         {structure}{marker}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer the question specifically about this repository. Format your response with markdown.\n",
        summary = entry.summary,
        total = entry.repo_info.total_files,
        languages = render_languages(&entry.languages),
        structure = char_prefix(&structure, STRUCTURE_EXCERPT_CHARS),
        marker = TRUNCATION_MARKER,
    )
}
