//! Source collection
//!
//! Walks a project directory and snapshots every file worth showing to
//! the model: recognized source extensions plus well-known build and
//! config manifests, skipping dependency/build/VCS directories and
//! anything too large to be useful.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// In-memory snapshot of a project's relevant text files.
///
/// Keys are paths relative to the scanned root. BTreeMap keeps the
/// iteration order stable so prompts built from a snapshot are
/// deterministic.
pub type SourceTree = BTreeMap<String, String>;

/// Files larger than this are skipped with a warning.
const MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Dependency, build output, VCS, and editor-state directories.
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "__pycache__",
    ".git",
    ".svn",
    ".hg",
    "target",
    "build",
    "dist",
    "out",
    "bin",
    "obj",
    ".gradle",
    ".maven",
    ".m2",
    ".sbt",
    ".ivy2",
    "vendor",
    "deps",
    "_build",
    ".mix",
    "venv",
    "env",
    ".venv",
    "virtualenv",
    ".pytest_cache",
    "coverage",
    "reports",
    "logs",
    "tmp",
    "temp",
    ".idea",
    ".vscode",
    "bower_components",
    "jspm_packages",
];

/// Extensions that count as source, config, or documentation.
const SOURCE_EXTENSIONS: &[&str] = &[
    // Programming languages
    "java", "py", "js", "ts", "jsx", "tsx", "go", "rs", "cpp", "c", "h", "hpp", "cs", "rb",
    "php", "kt", "scala", "swift", "dart", "r", "m", "mm",
    // Web technologies
    "html", "css", "scss", "sass", "less", "vue", "svelte",
    // Configuration and data files
    "json", "xml", "yml", "yaml", "toml", "ini", "conf", "config", "properties", "env",
    // Build and dependency files
    "gradle", "sbt", "cabal",
    // Database
    "sql", "ddl", "dml", "hql",
    // Documentation
    "md", "rst", "txt", "adoc",
];

/// Exact filenames included regardless of extension (build manifests etc.).
const SPECIAL_FILES: &[&str] = &[
    "Dockerfile",
    "Makefile",
    "CMakeLists.txt",
    "configure.ac",
    "Vagrantfile",
    "Jenkinsfile",
    "Gruntfile.js",
    "gulpfile.js",
    "webpack.config.js",
    "rollup.config.js",
    "vite.config.js",
    "tsconfig.json",
    "jsconfig.json",
    "babel.config.js",
    ".eslintrc",
    ".prettierrc",
    ".babelrc",
    "jest.config.js",
    "pom.xml",
    "build.gradle",
    "package.json",
    "requirements.txt",
    "Pipfile",
    "Cargo.toml",
    "go.mod",
    "composer.json",
    "Gemfile",
    "setup.py",
    "pyproject.toml",
    "docker-compose.yml",
    "docker-compose.yaml",
    ".gitignore",
    ".dockerignore",
];

/// Collect the relevant source files under `root` into a [`SourceTree`].
///
/// Skipped files (oversized, unreadable, non-UTF-8) produce one warning
/// each on stderr and never abort the scan. A nonexistent root yields an
/// empty tree.
pub fn collect_sources(root: &Path) -> SourceTree {
    let mut sources = SourceTree::new();

    if !root.exists() {
        eprintln!("  Warning: directory not found: {}", root.display());
        return sources;
    }

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.path() == root || !should_skip_dir(e))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !should_include(path) {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        match entry.metadata() {
            Ok(meta) if meta.len() > MAX_FILE_BYTES => {
                eprintln!("  Warning: skipping large file: {}", relative);
                continue;
            }
            Ok(_) => {}
            Err(_) => continue,
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                sources.insert(relative, content);
            }
            Err(err) => {
                eprintln!("  Warning: could not read {}: {}", relative, err);
            }
        }
    }

    sources
}

fn should_skip_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| SKIP_DIRS.contains(&name) || name.starts_with('.'))
        .unwrap_or(false)
}

fn should_include(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if SPECIAL_FILES.contains(&name) {
            return true;
        }
    }

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        return SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str());
    }

    false
}
