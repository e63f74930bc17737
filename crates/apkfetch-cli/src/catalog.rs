//! Package list reading.

use std::path::Path;

use anyhow::{Context, Result};
use apkfetch_schema::PackageRequest;

/// Parses `package,category` lines.
///
/// Whitespace is removed; blank lines, `#` comments and lines without
/// exactly two non-empty fields are ignored.
///
/// ```
/// use apkfetch_cli::catalog::parse;
///
/// let requests = parse("com.a, GAME\n\ncom.b,TOOLS,extra\n# note\ncom.c,Social");
/// assert_eq!(requests.len(), 2);
/// assert_eq!(requests[0].category.as_str(), "GAME");
/// ```
pub fn parse(text: &str) -> Vec<PackageRequest> {
    text.lines()
        .filter_map(|line| {
            let line: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            if line.starts_with('#') {
                return None;
            }
            match line.split(',').collect::<Vec<_>>().as_slice() {
                [id, category] if !id.is_empty() && !category.is_empty() => {
                    Some(PackageRequest::new(*id, *category))
                }
                _ => None,
            }
        })
        .collect()
}

pub fn read(path: &Path) -> Result<Vec<PackageRequest>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read package list {}", path.display()))?;
    Ok(parse(&text))
}

/// The slice `[offset, offset + limit)` of `requests`, clamped to its length.
pub fn window(requests: &[PackageRequest], offset: usize, limit: Option<usize>) -> &[PackageRequest] {
    let start = offset.min(requests.len());
    let end = limit.map_or(requests.len(), |n| start.saturating_add(n).min(requests.len()));
    &requests[start..end]
}
