//! Display name suggestion.
//!
//! Names like "login" or "website" carry no information; when an item has
//! recognizable domains, such names are replaced with a capitalized
//! registrable domain.

use std::sync::OnceLock;

use regex::Regex;

use super::domains::registrable_domain;

/// Fallback name for generic items without any recognizable domain.
const FALLBACK_NAME: &str = "Website";

fn generic_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(login|website|account)?\s*$").expect("generic name pattern is valid")
    })
}

/// True for names that carry no information: empty, whitespace-only, or
/// exactly "login"/"website"/"account" (surrounding whitespace and case
/// ignored).
pub(crate) fn is_generic_name(name: &str) -> bool {
    generic_name_pattern().is_match(name)
}

/// Suggests a display name for an item.
///
/// A non-generic current name is kept as-is. Otherwise the least-decorated
/// domain wins: no subdomain preferred, then shortest, then alphabetically
/// first; its registrable form is returned with the first character
/// upper-cased. Generic items without domains fall back to `"Website"`.
pub(crate) fn suggest_name(current: &str, domains: &[String]) -> String {
    let current = current.trim();
    if !is_generic_name(current) {
        return current.to_string();
    }

    if let Some(chosen) = domains
        .iter()
        .min_by(|a, b| domain_rank(a).cmp(&domain_rank(b)))
    {
        let registrable = registrable_domain(chosen);
        if !registrable.is_empty() && registrable != **chosen {
            return capitalize_first(&registrable);
        }
        return capitalize_first(chosen);
    }

    FALLBACK_NAME.to_string()
}

fn domain_rank(domain: &str) -> (bool, usize, &str) {
    let has_subdomain = domain.split('.').count() > 2;
    (has_subdomain, domain.len(), domain)
}

/// Upper-cases only the first character; the rest of the string, label dots
/// included, stays unchanged (`service.org` becomes `Service.org`).
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
