//! Allocation-size statistics over a directory of allocation traces.
//!
//! Standalone utility: no dependency on the comparison engine. Lines whose
//! first character is `a` (allocate) or `r` (reallocate) contribute their
//! third whitespace-delimited field as a size; everything else, including
//! free records and malformed lines, is silently ignored.

use crate::errors::TracecheckError;
use crate::runtime::Terminal;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse allocation sizes out of one trace's text, in file order.
pub fn collect_sizes(text: &str) -> Vec<u64> {
    text.lines()
        .filter(|line| line.starts_with('a') || line.starts_with('r'))
        .filter_map(|line| line.split_whitespace().nth(2))
        .filter_map(|field| field.parse::<u64>().ok())
        .collect()
}

/// Frequency of each exact size value, ascending by size.
pub fn size_histogram(sizes: &[u64]) -> BTreeMap<u64, u64> {
    let mut histogram = BTreeMap::new();
    for size in sizes {
        *histogram.entry(*size).or_insert(0u64) += 1;
    }
    histogram
}

/// Bar length on a logarithmic frequency axis.
fn log_bar(count: u64) -> String {
    let len = 64 - count.leading_zeros() as usize; // floor(log2) + 1
    "#".repeat(len)
}

/// Print one trace's histogram as a size/frequency table with log-scaled
/// bars, headed by the min and max observed sizes.
pub fn render_histogram(
    name: &str,
    histogram: &BTreeMap<u64, u64>,
    terminal: &dyn Terminal,
) -> Result<(), TracecheckError> {
    let Some((min, _)) = histogram.iter().next() else {
        return terminal.write_line(&format!("{name}: no allocation records"));
    };
    let (max, _) = histogram.iter().next_back().unwrap_or((min, &0));
    terminal.write_line(&format!("{name}: min {min} max {max}"))?;
    for (size, count) in histogram {
        terminal.write_line(&format!("{size:>10} {count:>8} {}", log_bar(*count)))?;
    }
    Ok(())
}

/// Scan every regular file under `root` and print its histogram.
pub fn run_stats(root: &Path, terminal: &dyn Terminal) -> Result<(), TracecheckError> {
    let mut files = Vec::new();
    walk_files(root, &mut files)?;
    files.sort();
    for path in files {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            // binary or unreadable entries are not allocation traces
            Err(_) => continue,
        };
        let name = path
            .strip_prefix(root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string());
        let histogram = size_histogram(&collect_sizes(&text));
        render_histogram(&name, &histogram, terminal)?;
    }
    Ok(())
}

fn walk_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TracecheckError> {
    let entries = fs::read_dir(dir).map_err(|e| TracecheckError::Io(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| TracecheckError::Io(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            let _ = walk_files(&path, files);
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
