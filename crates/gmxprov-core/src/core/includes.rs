use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds the `#include "*.itp"` files a topology pulls in that live next to it.
///
/// Includes resolved from the GROMACS force-field library (e.g.
/// `oplsaa.ff/forcefield.itp`) are not present locally and are skipped.
pub fn find_itp_includes(topology: &Path) -> io::Result<Vec<PathBuf>> {
    let content = fs::read_to_string(topology)?;
    let base = topology.parent().unwrap_or_else(|| Path::new("."));

    let mut seen = BTreeSet::new();
    let mut includes = Vec::new();
    for line in content.lines() {
        let Some(rest) = line.trim_start().strip_prefix("#include") else {
            continue;
        };
        let Some(name) = quoted(rest) else {
            continue;
        };
        if !name.ends_with(".itp") || !seen.insert(name.to_string()) {
            continue;
        }
        let candidate = base.join(name);
        if candidate.is_file() {
            includes.push(candidate);
        } else {
            debug!("Skipping include '{}' not found next to the topology", name);
        }
    }
    Ok(includes)
}

fn quoted(s: &str) -> Option<&str> {
    let s = s.trim();
    let inner = s.strip_prefix('"')?;
    let end = inner.find('"')?;
    Some(&inner[..end])
}
