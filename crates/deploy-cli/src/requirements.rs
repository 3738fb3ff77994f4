use crate::error::DeployError;
use anyhow::Context as _;
use std::path::Path;

/// Read a newline-delimited dependency list; lines are trimmed and blanks dropped.
///
/// A missing file is reported as [`DeployError::RequirementsNotFound`].
pub fn read_requirements(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DeployError::RequirementsNotFound(path.to_path_buf()).into());
        }
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    Ok(parse_requirements(&text))
}

pub fn parse_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
