//! SCSS compilation.
//!
//! Every `.scss` file under the content root compiles to the same relative
//! path in the output with a `.css` extension:
//!
//! ```text
//! content/assets/scss/main.scss      →  dist/assets/scss/main.css
//! content/assets/scss/_variables.scss   (partial, only imported)
//! ```
//!
//! Files whose name starts with `_` are partials and are only reachable
//! through `@use`/`@import`. Imports resolve against the importing file's
//! directory, then the shared SCSS directory (`[build] scss_dir`).

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walking {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("compiling {path}: {message}")]
    Compile { path: PathBuf, message: String },
}

/// A stylesheet written by [`compile_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStyle {
    /// Source path relative to the content root.
    pub source: PathBuf,
    /// Output path relative to the output root.
    pub output: PathBuf,
    pub bytes: usize,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('_'))
}

fn is_scss(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("scss"))
}

/// Every non-partial `.scss` file under `content_dir`, sorted.
pub fn find_stylesheets(content_dir: &Path) -> Result<Vec<PathBuf>, StyleError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(content_dir)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.map_err(|source| StyleError::Walk {
            path: content_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && is_scss(path) && !is_partial(path) {
            found.push(path.to_path_buf());
        }
    }
    found.sort();
    Ok(found)
}

/// Compile one file to compressed CSS.
pub fn compile(path: &Path, shared_dir: &Path) -> Result<String, StyleError> {
    let mut options = grass::Options::default().style(grass::OutputStyle::Compressed);
    if let Some(parent) = path.parent() {
        options = options.load_path(parent);
    }
    options = options.load_path(shared_dir);
    grass::from_path(path, &options).map_err(|e| StyleError::Compile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Compile every stylesheet under `content_dir` into `output_dir`.
/// The first compilation error aborts.
pub fn compile_all(
    content_dir: &Path,
    output_dir: &Path,
    scss_dir: &str,
) -> Result<Vec<CompiledStyle>, StyleError> {
    let shared_dir = content_dir.join(scss_dir);
    let mut compiled = Vec::new();
    for path in find_stylesheets(content_dir)? {
        let css = compile(&path, &shared_dir)?;
        let source = path.strip_prefix(content_dir).unwrap_or(&path).to_path_buf();
        let output = source.with_extension("css");
        let dest = output_dir.join(&output);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, &css)?;
        tracing::debug!(source = %source.display(), bytes = css.len(), "compiled stylesheet");
        compiled.push(CompiledStyle {
            source,
            output,
            bytes: css.len(),
        });
    }
    Ok(compiled)
}
