//! Resolve user-typed ids: exact match first, then a unique prefix.

use crate::errors::LookupError;

/// Pick the one id equal to, or starting with, `wanted`
pub fn resolve<'a>(
    kind: &'static str,
    ids: impl IntoIterator<Item = &'a str>,
    wanted: &str,
) -> Result<String, LookupError> {
    let wanted = wanted.trim();
    if wanted.is_empty() {
        return Err(LookupError::not_found(kind, wanted));
    }

    let mut matches = Vec::new();
    for id in ids {
        if id == wanted {
            return Ok(id.to_string());
        }
        if id.starts_with(wanted) {
            matches.push(id);
        }
    }

    match matches.as_slice() {
        [only] => Ok(only.to_string()),
        [] => Err(LookupError::not_found(kind, wanted)),
        many => Err(LookupError::Ambiguous {
            kind,
            prefix: wanted.to_string(),
            count: many.len(),
        }),
    }
}

/// Like [`resolve`], but a small number is taken as a 1-based position
pub fn resolve_positional<'a>(
    kind: &'static str,
    ids: &[&'a str],
    wanted: &str,
) -> Result<String, LookupError> {
    if let Ok(position) = wanted.trim().parse::<usize>() {
        if position >= 1 && position <= ids.len() {
            return Ok(ids[position - 1].to_string());
        }
    }
    resolve(kind, ids.iter().copied(), wanted)
}

/// First eight characters, enough to type back
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
