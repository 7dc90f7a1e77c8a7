//! Filter-fragment rendering for the downstream query engine.
//!
//! The engine's grammar expresses gene selection as a membership test on the
//! `feature_id` column with single-quoted string literals:
//! `feature_id in ['ENSG00000012048', 'ENSG00000141510']`.

use std::collections::BTreeSet;

use crate::error::RenderError;
use crate::gene::StableId;

/// Column holding stable identifiers in the downstream var table.
pub const IDENTIFIER_COLUMN: &str = "feature_id";

/// Render a membership test over `ids`.
///
/// Identifiers are de-duplicated and sorted, so the output depends only on
/// the set of identifiers, not on input order.
pub fn render_filter<'a, I>(ids: I) -> Result<String, RenderError>
where
    I: IntoIterator<Item = &'a StableId>,
{
    let unique: BTreeSet<&str> = ids.into_iter().map(StableId::as_str).collect();
    if unique.is_empty() {
        return Err(RenderError::EmptyIdentifierSet);
    }

    let quoted: Vec<String> = unique.into_iter().map(quote).collect();
    Ok(format!("{IDENTIFIER_COLUMN} in [{}]", quoted.join(", ")))
}

/// Join fragments with `and`, skipping blank ones.
pub fn and_join<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" and ")
}

fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for c in raw.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
