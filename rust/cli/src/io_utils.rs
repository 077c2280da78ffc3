//! File I/O utilities for reading hand records and preparing output paths.
//!
//! Functions return `Result<_, String>` so command handlers can pass the
//! message straight to `ui::write_error`.

use std::path::Path;

/// Read a text file, dropping a leading UTF-8 BOM.
///
/// # Example
///
/// ```rust,no_run
/// # use truco_cli::io_utils::read_text;
/// let content = read_text("data/hands.jsonl").unwrap();
/// ```
pub fn read_text(path: &str) -> Result<String, String> {
    let mut content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Ensure parent directory exists for given path, creating if needed.
///
/// ```rust,no_run
/// use std::path::Path;
/// # use truco_cli::io_utils::ensure_parent_dir;
///
/// ensure_parent_dir(Path::new("output/data/file.jsonl")).unwrap();
/// ```
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
        }
    }
    Ok(())
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}
