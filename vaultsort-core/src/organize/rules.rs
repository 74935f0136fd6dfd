//! Rule-based category classification.
//!
//! An ordered list of `(pattern, category, tags)` rules is scanned
//! domain-major, rule-minor: for each domain in first-seen order, every rule
//! is tried in priority order and the first hit wins. Rule order is a
//! deliberate precedence (Finance before Social before Developer, ...), so
//! the list is an explicit `Vec`, never a map.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

/// Default category for domains no rule recognizes.
pub(crate) const DEFAULT_CATEGORY: &str = "General";

/// Default tag accompanying [`DEFAULT_CATEGORY`].
pub(crate) const DEFAULT_TAG: &str = "general";

/// One classification outcome: a category label plus its tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Fixed-case category label, also used as the folder/collection name
    pub category: String,
    /// Lowercase tags, kept sorted for stable joining
    pub tags: BTreeSet<String>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            tags: BTreeSet::from([DEFAULT_TAG.to_string()]),
        }
    }
}

/// A single priority-ordered classification rule.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pattern: Regex,
    category: String,
    tags: Vec<String>,
}

impl CategoryRule {
    /// Creates a rule matching `pattern` case-insensitively anywhere in a
    /// domain.
    pub fn new(pattern: &str, category: impl Into<String>, tags: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("(?i){pattern}"))?,
            category: category.into(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        })
    }

    /// The category this rule assigns.
    pub fn category(&self) -> &str {
        &self.category
    }

    fn matches(&self, domain: &str) -> bool {
        self.pattern.is_match(domain)
    }

    fn classification(&self) -> Classification {
        Classification {
            category: self.category.clone(),
            tags: self.tags.iter().cloned().collect(),
        }
    }
}

/// Priority-ordered classification rules with first-match-wins semantics.
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    rules: Vec<CategoryRule>,
}

impl Ruleset {
    /// Creates an empty ruleset; every domain falls through to
    /// `General`/`general`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule at the lowest priority.
    pub fn push(&mut self, rule: CategoryRule) {
        self.rules.push(rule);
    }

    /// The builtin ruleset, compiled once per process.
    pub fn builtin() -> &'static Ruleset {
        static RULES: OnceLock<Ruleset> = OnceLock::new();
        RULES.get_or_init(Self::compile_builtin)
    }

    /// Classifies a normalized domain list.
    ///
    /// Scans domains in order; for each domain, rules are tried in priority
    /// order and the first hit is returned immediately. No domain matching
    /// any rule yields the `General`/`general` default.
    pub fn classify(&self, domains: &[String]) -> Classification {
        for domain in domains {
            for rule in &self.rules {
                if rule.matches(domain) {
                    return rule.classification();
                }
            }
        }
        Classification::default()
    }

    fn compile_builtin() -> Self {
        let table: &[(&str, &str, &[&str])] = &[
            // Finance / Banking / Crypto
            (
                r"(paypal|stripe|wise|revolut|americanexpress|chase|barclays|hsbc|capitalone|bofa|coinbase|kraken|binance|ftx|monzo)",
                "Finance",
                &["finance"],
            ),
            // Social / Community
            (
                r"(facebook|instagram|twitter|x\.com|tiktok|snapchat|reddit|discord|slack)",
                "Social",
                &["social"],
            ),
            // Developer / Code / CI
            (
                r"(github|gitlab|bitbucket|docker|heroku|vercel|netlify|sentry|linear|atlassian)",
                "Developer",
                &["dev"],
            ),
            // Cloud / Infra
            (
                r"(aws\.amazon|azure|microsoftonline|gcp|cloud\.google|cloudflare|digitalocean|linode|vultr)",
                "Cloud",
                &["cloud"],
            ),
            // Email / Identity
            (
                r"(gmail|protonmail|fastmail|outlook|live\.com|yahoo)",
                "Email",
                &["email"],
            ),
            // Shopping
            (
                r"(amazon|ebay|aliexpress|walmart|target|bestbuy|newegg|etsy)",
                "Shopping",
                &["shopping"],
            ),
            // Government / Utilities
            (
                r"(gov\.|\.gov|hmrc|irs|uscis|ssa\.gov|dvla|uscourts)",
                "Government/Utilities",
                &["gov"],
            ),
            // Travel
            (
                r"(airbnb|booking|expedia|uber|lyft|delta|united|aa\.com|ryanair|easyjet)",
                "Travel",
                &["travel"],
            ),
            // Security
            (
                r"(yubico|duo|authy|1password|lastpass|bitwarden\.com)",
                "Security",
                &["security"],
            ),
        ];

        let mut ruleset = Self::new();
        for (pattern, category, tags) in table {
            let rule =
                CategoryRule::new(pattern, *category, tags).expect("builtin rule pattern is valid");
            ruleset.push(rule);
        }
        ruleset
    }
}
