use crate::errors::TracecheckError;
use std::fs;
use std::path::{Path, PathBuf};

pub const TRACE_PREFIX: &str = "trace";
pub const TRACE_SUFFIX: &str = ".txt";

/// One recorded session file found under the traces root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFile {
    /// Full path, usable for the driver invocation.
    pub path: PathBuf,
    /// Root-relative path, used for reporting.
    pub name: String,
}

/// Recursively enumerate `trace*.txt` files under `root`. Matching is
/// case-sensitive on both tokens. Results are sorted by path so reports are
/// stable; callers must not rely on the order for correctness.
pub fn discover_traces(root: &Path) -> Result<Vec<TraceFile>, TracecheckError> {
    let mut found = Vec::new();
    walk(root, root, &mut found)?;
    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

fn walk(root: &Path, dir: &Path, found: &mut Vec<TraceFile>) -> Result<(), TracecheckError> {
    let entries = fs::read_dir(dir).map_err(|e| TracecheckError::Io(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| TracecheckError::Io(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            // subdirectories that vanish mid-walk are skipped, not fatal
            let _ = walk(root, &path, found);
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with(TRACE_PREFIX) && file_name.ends_with(TRACE_SUFFIX) {
            let name = path
                .strip_prefix(root)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| path.display().to_string());
            found.push(TraceFile { path, name });
        }
    }
    Ok(())
}
