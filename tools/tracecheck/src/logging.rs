use crate::errors::TracecheckError;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

pub const DEFAULT_DISK_BUDGET_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: 4096,
            budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), TracecheckError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| TracecheckError::Io(e.to_string()))?;
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| TracecheckError::Io(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TracecheckError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| TracecheckError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| TracecheckError::Io(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            let _ = enforce_total_budget(parent, self.budget_bytes)?;
        }

        Ok(())
    }
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut truncated = rendered;
    truncated.truncate(max_bytes.saturating_sub(3));
    Value::String(format!("{truncated}..."))
}

/// Delete the oldest files in `dir` until the directory fits `budget_bytes`.
pub fn enforce_total_budget(
    dir: &Path,
    budget_bytes: u64,
) -> Result<Vec<PathBuf>, TracecheckError> {
    let mut files = fs::read_dir(dir)
        .map_err(|e| TracecheckError::Io(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();

    files.sort_by(|a, b| {
        let ma = fs::metadata(a).ok().and_then(|m| m.modified().ok());
        let mb = fs::metadata(b).ok().and_then(|m| m.modified().ok());
        ma.cmp(&mb)
    });

    let mut total = files
        .iter()
        .filter_map(|path| fs::metadata(path).ok().map(|meta| meta.len()))
        .sum::<u64>();

    let mut deleted = Vec::new();
    for path in files {
        if total <= budget_bytes {
            break;
        }
        let len = fs::metadata(&path)
            .map_err(|e| TracecheckError::Io(e.to_string()))?
            .len();
        fs::remove_file(&path).map_err(|e| TracecheckError::Io(e.to_string()))?;
        total = total.saturating_sub(len);
        deleted.push(path);
    }

    Ok(deleted)
}

static RUN_LOGGER: OnceLock<Mutex<Option<JsonlLogger>>> = OnceLock::new();

fn logger_slot() -> &'static Mutex<Option<JsonlLogger>> {
    RUN_LOGGER.get_or_init(|| Mutex::new(None))
}

/// Route `append_run_log` calls to a JSONL file. Only the production entry
/// point initializes this; library callers and tests run without it.
pub fn init_run_logger(path: impl AsRef<Path>) {
    *logger_slot().lock().expect("run logger init lock") = Some(JsonlLogger::new(path));
}

pub fn clear_run_logger() {
    *logger_slot().lock().expect("run logger clear lock") = None;
}

/// Best-effort structured logging; a no-op until the logger is initialized.
pub fn append_run_log(level: &str, event_type: &str, payload: Value) {
    let guard = logger_slot().lock().expect("run logger lock");
    if let Some(logger) = guard.as_ref() {
        let logger = logger.clone();
        drop(guard);
        let _ = logger.append(&LogEvent {
            level,
            event_type,
            payload,
        });
    }
}
