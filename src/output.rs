use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::constants::SPLIT_INDEX_FILE;
use crate::domain::Minister;
use crate::error::Result;

const MAX_SLUG_LEN: usize = 80;

/// Manifest entry pointing at one per-minister file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    pub role: String,
    pub portfolio: String,
    pub file: String,
}

/// Pretty JSON with a trailing newline
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Write the whole roster as one JSON array, creating parent directories
pub fn write_document(ministers: &[Minister], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, render(ministers)?)?;
    info!("💾 Wrote {} ministers to {}", ministers.len(), path.display());
    Ok(())
}

/// Write one file per minister plus `index.json`.
/// Stale `*.json` files in `dir` are removed first.
pub fn write_split(ministers: &[Minister], dir: &Path) -> Result<Vec<IndexEntry>> {
    fs::create_dir_all(dir)?;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            debug!(path = %path.display(), "Removing stale file");
            fs::remove_file(&path)?;
        }
    }

    let mut manifest = Vec::with_capacity(ministers.len());
    for minister in ministers {
        let file_name = format!("{}-{}.json", slugify(&minister.name, &minister.id), minister.id);
        let file_path = dir.join(&file_name);
        fs::write(&file_path, render(minister)?)?;

        manifest.push(IndexEntry {
            id: minister.id.clone(),
            name: minister.name.clone(),
            role: minister.role.clone(),
            portfolio: minister.portfolio.clone(),
            file: display_path(&file_path),
        });
    }

    fs::write(dir.join(SPLIT_INDEX_FILE), render(&manifest)?)?;
    info!("📄 Wrote {} minister files and {} to {}", manifest.len(), SPLIT_INDEX_FILE, dir.display());
    Ok(manifest)
}

/// File-name slug: accents stripped, lowercase ASCII, dashes between words
pub fn slugify(input: &str, fallback: &str) -> String {
    let folded: String = input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { fallback } else { slug };
    slug.chars().take(MAX_SLUG_LEN).collect()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
