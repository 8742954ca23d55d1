//! Fixed tables and limits used by the profiling pipeline
//!
//! These values shape the prompts sent to the completion service, so they
//! are kept stable rather than tuned.

/// Directory names never descended into
pub const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "venv", "__pycache__", "dist", "build"];

/// File name suffixes that are never listed (case-sensitive)
pub const IGNORED_EXTENSIONS: &[&str] = &[
    ".pyc", ".jar", ".class", ".so", ".dll", ".exe", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico",
];

/// Files larger than this many bytes are neither listed nor read
pub const MAX_FILE_SIZE: u64 = 1_000_000;

/// Extension to language label table
pub const LANGUAGE_TABLE: &[(&str, &str)] = &[
    (".py", "Python"),
    (".js", "JavaScript"),
    (".jsx", "JavaScript (React)"),
    (".ts", "TypeScript"),
    (".tsx", "TypeScript (React)"),
    (".html", "HTML"),
    (".css", "CSS"),
    (".scss", "SCSS"),
    (".json", "JSON"),
    (".md", "Markdown"),
    (".yaml", "YAML"),
    (".yml", "YAML"),
    (".sh", "Shell"),
    (".java", "Java"),
    (".c", "C"),
    (".cpp", "C++"),
    (".go", "Go"),
    (".rb", "Ruby"),
    (".php", "PHP"),
];

/// Manifest and config paths that count as key files (full relative path)
pub const KEY_FILES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "setup.py",
    "Dockerfile",
    ".env.example",
    "config.py",
];

/// Relative path of the README, compared case-insensitively
pub const README_PATH: &str = "readme.md";

/// Characters of README kept in the profile
pub const README_EXCERPT_CHARS: usize = 500;

/// Appended to text cut at a fixed length
pub const TRUNCATION_MARKER: &str = "...";

/// Default number of profiles held by the result cache
pub const DEFAULT_CACHE_CAPACITY: usize = 64;
