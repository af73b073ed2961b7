//! Address suggestion cleanup: street number repair, label completion and dedupe

use std::collections::HashSet;

use crate::value_objects::AddressCandidate;

const MAX_HOUSE_NUMBER_LEN: usize = 6;

/// Looks like a house number: starts with a digit, e.g. `114`, `12bis`, `3B`
fn is_house_number(token: &str) -> bool {
    token.len() <= MAX_HOUSE_NUMBER_LEN
        && token.chars().next().is_some_and(|c| c.is_ascii_digit())
        && token.chars().all(char::is_alphanumeric)
}

fn query_has_token(query: &str, token: &str) -> bool {
    query
        .split(|c: char| !c.is_alphanumeric())
        .any(|t| t.eq_ignore_ascii_case(token))
}

/// Byte offset of the first case-insensitive occurrence of `needle`
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let needle_lower = needle.to_lowercase();
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        haystack
            .get(i..i + needle.len())
            .is_some_and(|s| s.to_lowercase() == needle_lower)
    })
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle).is_some()
}

fn replace_first_ci(haystack: &str, needle: &str, replacement: &str) -> Option<String> {
    let start = find_ci(haystack, needle)?;
    let end = start + needle.len();
    Some(format!("{}{replacement}{}", &haystack[..start], &haystack[end..]))
}

fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, sep: &str) -> String {
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Separate a house number that leaked into the street field
///
/// Leading number tokens are removed from `street` when they repeat the known
/// `street_number`, or when no number is known and the user typed that token in
/// `query` (in which case it becomes the street number).
///
/// `"114 114 route de cremieu"` with no number and query `"114 route"` yields
/// `("route de cremieu", Some("114"))`.
#[must_use]
pub fn split_street_number(
    street: &str,
    street_number: Option<&str>,
    query: &str,
) -> (String, Option<String>) {
    let mut tokens: Vec<&str> = street.split_whitespace().collect();
    let mut number = street_number
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(ToString::to_string);

    while tokens.len() > 1 && is_house_number(tokens[0]) {
        let lead = tokens[0];
        match &number {
            Some(n) if n.eq_ignore_ascii_case(lead) => {},
            None if query_has_token(query, lead) => number = Some(lead.to_string()),
            _ => break,
        }
        tokens.remove(0);
    }

    (tokens.join(" "), number)
}

/// Formatted label built only from structured components
#[must_use]
pub fn synthesize_label(candidate: &AddressCandidate) -> String {
    let number_street = join_present(
        [candidate.street_number.as_deref(), candidate.street.as_deref()],
        " ",
    );
    let postcode_city = join_present([candidate.postcode.as_deref(), candidate.city.as_deref()], " ");
    join_present(
        [
            Some(number_street.as_str()),
            Some(postcode_city.as_str()),
            candidate.country.as_deref(),
        ],
        ", ",
    )
}

/// Repair a provider candidate so its fields and label agree
///
/// After normalization the label contains the "number street" fragment, the
/// "postcode city" fragment and the country, whenever those fields are known.
#[must_use]
pub fn normalize_candidate(mut candidate: AddressCandidate, query: &str) -> AddressCandidate {
    let original_number = non_empty(candidate.street_number.take());
    let (street, number) = match non_empty(candidate.street.take()) {
        Some(street) => {
            let (street, number) = split_street_number(&street, original_number.as_deref(), query);
            (Some(street).filter(|s| !s.is_empty()), number)
        },
        None => (None, original_number),
    };
    candidate.street = street;
    candidate.street_number = number;
    candidate.postcode = non_empty(candidate.postcode.take());
    candidate.city = non_empty(candidate.city.take());
    candidate.country = non_empty(candidate.country.take());

    let mut label = candidate.label.trim().to_string();
    if label.is_empty() {
        label = synthesize_label(&candidate);
    }

    if let Some(number) = &candidate.street_number {
        let doubled = format!("{number} {number} ");
        if let Some(fixed) = replace_first_ci(&label, &doubled, &format!("{number} ")) {
            label = fixed;
        }
    }

    if let Some(street) = &candidate.street {
        let fragment = join_present([candidate.street_number.as_deref(), Some(street)], " ");
        if !contains_ci(&label, &fragment) {
            label = replace_first_ci(&label, street, &fragment)
                .unwrap_or_else(|| prepend(&fragment, &label));
        }
    }

    let postcode_city = join_present([candidate.postcode.as_deref(), candidate.city.as_deref()], " ");
    if !postcode_city.is_empty() && !contains_ci(&label, &postcode_city) {
        label = candidate
            .city
            .as_deref()
            .filter(|_| candidate.postcode.is_some())
            .and_then(|city| replace_first_ci(&label, city, &postcode_city))
            .unwrap_or_else(|| append(&label, &postcode_city));
    }

    if let Some(country) = &candidate.country {
        if !contains_ci(&label, country) {
            label = append(&label, country);
        }
    }

    candidate.label = label;
    candidate
}

fn prepend(fragment: &str, label: &str) -> String {
    if label.is_empty() {
        fragment.to_string()
    } else {
        format!("{fragment}, {label}")
    }
}

fn append(label: &str, fragment: &str) -> String {
    if label.is_empty() {
        fragment.to_string()
    } else {
        format!("{label}, {fragment}")
    }
}

/// Remove duplicate suggestions, keeping the first occurrence
///
/// Two candidates are duplicates when their lowercased label, position,
/// postcode and city are all equal.
#[must_use]
pub fn dedupe_candidates(candidates: Vec<AddressCandidate>) -> Vec<AddressCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            seen.insert((
                c.label.to_lowercase(),
                c.lat.to_bits(),
                c.lng.to_bits(),
                c.postcode.as_deref().map(str::to_lowercase),
                c.city.as_deref().map(str::to_lowercase),
            ))
        })
        .collect()
}
