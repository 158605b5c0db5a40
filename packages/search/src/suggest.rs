//! Location autocomplete over the MLS records.

use std::collections::HashSet;

use realty_map_listing_models::{RawRecord, Suggestion, SuggestionType};

/// Builds ranked, de-duplicated suggestions for `query` from `records`.
///
/// Each record's address, town and ZIP are tested on their own; every
/// field that matches yields a candidate. The first candidate for a given
/// [`Suggestion::dedup_key`] wins. Candidates whose display value starts
/// with the query rank first, then addresses before cities before ZIP
/// codes, then encounter order. At most `limit` suggestions are returned.
#[must_use]
pub fn rank_suggestions<'a>(
    records: impl IntoIterator<Item = &'a RawRecord>,
    query: &str,
    limit: usize,
) -> Vec<Suggestion> {
    let lowered = query.to_lowercase();
    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();

    for record in records {
        for suggestion in candidates(record, &lowered) {
            if seen.insert(suggestion.dedup_key()) {
                suggestions.push(suggestion);
            }
        }
    }

    suggestions.sort_by_cached_key(|s| {
        let prefix = s.display_value().to_lowercase().starts_with(&lowered);
        (!prefix, s.kind.priority())
    });
    suggestions.truncate(limit);
    suggestions
}

/// A field matches if it contains the query anywhere, case-insensitively.
/// This covers a word of the field starting with the query too.
fn is_match(value: Option<&str>, lowered_query: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(lowered_query))
}

fn candidates(record: &RawRecord, lowered_query: &str) -> Vec<Suggestion> {
    let mut out = Vec::with_capacity(3);
    let town = record.town.as_deref().unwrap_or_default();
    let state = record.state.as_deref().unwrap_or_default();

    if is_match(record.address.as_deref(), lowered_query) {
        out.push(Suggestion {
            id: format!(
                "address-{}",
                record.list_no.as_deref().unwrap_or_default()
            ),
            kind: SuggestionType::Address,
            line: record.address.clone(),
            city: record.town.clone(),
            state_code: record.state.clone(),
            postal_code: record.zip_code.clone(),
        });
    }

    if is_match(record.town.as_deref(), lowered_query) {
        out.push(Suggestion {
            id: format!("city-{town}-{state}"),
            kind: SuggestionType::City,
            line: None,
            city: record.town.clone(),
            state_code: record.state.clone(),
            postal_code: None,
        });
    }

    if let Some(zip) = &record.zip_code
        && is_match(Some(zip.as_str()), lowered_query)
    {
        out.push(Suggestion {
            id: format!("zip-{zip}"),
            kind: SuggestionType::PostalCode,
            line: None,
            city: record.town.clone(),
            state_code: record.state.clone(),
            postal_code: Some(zip.clone()),
        });
    }

    out
}
