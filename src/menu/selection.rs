//! Parsing of the 1-based numbers users type to pick from the last list shown.
use crate::news::{Source, SourceSelection};

/// Parse a single 1-based position into a 0-based index into a list of `len`.
pub fn parse_position(input: &str, len: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

/// Parse a comma-separated list of 1-based positions, or `all`.
///
/// Duplicates collapse (first occurrence wins the order). One bad entry
/// rejects the whole input.
pub fn parse_source_choice(input: &str, sources: &[Source]) -> Option<SourceSelection> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Some(SourceSelection::All);
    }

    let mut ids: Vec<String> = Vec::new();
    for part in input.split(',') {
        let index = parse_position(part, sources.len())?;
        let id = &sources[index].id;
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    Some(SourceSelection::Only(ids))
}

/// Human-readable form of the current selection.
///
/// Ids no longer present in `sources` are shown as-is.
pub fn describe_selection(selection: &SourceSelection, sources: &[Source]) -> String {
    match selection {
        SourceSelection::Only(ids) if !ids.is_empty() => ids
            .iter()
            .map(|id| {
                sources
                    .iter()
                    .find(|s| &s.id == id)
                    .map(|s| s.name.as_str())
                    .unwrap_or(id.as_str())
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => "All".to_string(),
    }
}
