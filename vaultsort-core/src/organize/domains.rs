//! Domain extraction and normalization.
//!
//! Reduces an item's stored URIs to an ordered, de-duplicated list of
//! registrable domains. Malformed URIs are skipped, never fatal to the item.

use crate::models::Item;

/// Public suffixes that keep three labels in the registrable domain
/// (`api.service.co.uk` reduces to `service.co.uk`, not `co.uk`).
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "gov.uk", "ac.uk", "com.au", "com.br", "com.mx", "com.tr", "co.jp", "co.nz", "co.za",
];

/// Returns the registrable domain of an already-normalized host.
///
/// Hosts with fewer than two labels pass through unchanged.
pub(crate) fn registrable_domain(domain: &str) -> String {
    if domain.is_empty() {
        return String::new();
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return domain.to_string();
    }

    if labels.len() >= 3 && MULTI_LABEL_SUFFIXES.contains(&labels[labels.len() - 2..].join(".").as_str()) {
        return labels[labels.len() - 3..].join(".");
    }

    labels[labels.len() - 2..].join(".")
}

/// Normalizes one URI string to its registrable domain.
///
/// Scheme-qualified URIs are parsed for their host component; anything else
/// is treated as a bare host. Returns `None` for empty input or hosts that
/// cannot be parsed.
pub(crate) fn normalize_uri(uri: &str) -> Option<String> {
    let host = if uri.contains("://") {
        url::Url::parse(uri).ok()?.host_str()?.to_string()
    } else {
        uri.to_string()
    };

    let mut domain = host.trim().to_lowercase();
    if let Some(stripped) = domain.strip_prefix("www.") {
        domain = stripped.to_string();
    }
    if domain.is_empty() {
        return None;
    }

    let registrable = registrable_domain(&domain);
    if registrable.is_empty() {
        None
    } else {
        Some(registrable)
    }
}

/// Extracts the ordered, de-duplicated registrable domains of an item.
///
/// Items without a login payload or stored URIs yield an empty list.
pub(crate) fn extract_domains(item: &Item) -> Vec<String> {
    let mut domains = Vec::new();
    let Some(login) = item.login() else {
        return domains;
    };

    for entry in login.uris() {
        let Some(uri) = entry.uri() else { continue };
        if uri.is_empty() {
            continue;
        }
        let Some(registrable) = normalize_uri(uri) else {
            continue;
        };
        if !domains.contains(&registrable) {
            domains.push(registrable);
        }
    }

    domains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Export;
    use serde_json::json;

    fn item_with_uris(uris: &[&str]) -> Item {
        let entries: Vec<_> = uris.iter().map(|u| json!({"uri": u})).collect();
        let export = Export::from_value(json!({
            "items": [{"name": "x", "login": {"uris": entries}}]
        }))
        .unwrap();
        export.items[0].clone()
    }

    #[test]
    fn test_registrable_domain_standard() {
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("api.service.org"), "service.org");
        assert_eq!(registrable_domain("a.b.c.example.net"), "example.net");
    }

    #[test]
    fn test_registrable_domain_multi_label_suffix() {
        assert_eq!(registrable_domain("api.service.co.uk"), "service.co.uk");
        assert_eq!(registrable_domain("shop.example.com.au"), "example.com.au");
        // The suffix alone still reduces to its final two labels
        assert_eq!(registrable_domain("co.uk"), "co.uk");
    }

    #[test]
    fn test_registrable_domain_short_hosts() {
        assert_eq!(registrable_domain("localhost"), "localhost");
        assert_eq!(registrable_domain(""), "");
    }

    #[test]
    fn test_normalize_uri_from_url() {
        assert_eq!(
            normalize_uri("https://WWW.EXAMPLE.COM/path").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            normalize_uri("ftp://old-site.net").as_deref(),
            Some("old-site.net")
        );
    }

    #[test]
    fn test_normalize_uri_bare_host() {
        assert_eq!(normalize_uri("test.org").as_deref(), Some("test.org"));
        assert_eq!(
            normalize_uri("API.SERVICE.CO.UK").as_deref(),
            Some("service.co.uk")
        );
    }

    #[test]
    fn test_normalize_uri_malformed() {
        assert_eq!(normalize_uri("://"), None);
        assert_eq!(normalize_uri("http://"), None);
    }

    #[test]
    fn test_extract_domains_ordered_dedup() {
        let item = item_with_uris(&[
            "https://example.com/login",
            "https://www.example.com/alt",
            "https://api.service.org",
        ]);
        assert_eq!(extract_domains(&item), vec!["example.com", "service.org"]);
    }

    #[test]
    fn test_extract_domains_skips_malformed() {
        let item = item_with_uris(&["://broken", "https://example.com"]);
        assert_eq!(extract_domains(&item), vec!["example.com"]);
    }

    #[test]
    fn test_extract_domains_no_login() {
        let export = Export::from_value(json!({"items": [{"name": "x"}]})).unwrap();
        assert!(extract_domains(&export.items[0]).is_empty());

        let export = Export::from_value(json!({
            "items": [{"name": "x", "login": {"uris": []}}]
        }))
        .unwrap();
        assert!(extract_domains(&export.items[0]).is_empty());
    }
}
