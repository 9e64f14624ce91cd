//! Public Suffix List (PSL) utilities for eTLD+1 extraction
//!
//! Suffix data is injected through the [`SuffixResolver`] trait so the
//! compilers never touch global state. Two resolvers are provided:
//!
//! - [`SuffixTable`]: rules loaded at runtime from PSL text (a file on disk, or
//!   a handful of synthetic rules in tests)
//! - [`BuiltinSuffixes`]: the list compiled into the `psl` crate
//!
//! # Examples
//!
//! ```
//! use genpac_core::psl::{SuffixResolver, SuffixTable};
//!
//! let table = SuffixTable::parse("com\nuk\nco.uk\n");
//! assert_eq!(table.registrable_domain("sub.example.com").unwrap().as_deref(), Some("example.com"));
//! assert_eq!(table.registrable_domain("sub.example.co.uk").unwrap().as_deref(), Some("example.co.uk"));
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

const MAX_HOST_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuffixError {
    #[error("empty host")]
    EmptyHost,
    #[error("host too long: {0} bytes")]
    HostTooLong(usize),
    #[error("empty label in host '{0}'")]
    EmptyLabel(String),
    #[error("label too long in host '{0}'")]
    LabelTooLong(String),
    #[error("invalid character {ch:?} in host '{host}'")]
    InvalidCharacter { host: String, ch: char },
}

#[derive(Debug, thiserror::Error)]
pub enum SuffixTableError {
    #[error("Failed to read suffix list: {0}")]
    Io(#[from] std::io::Error),
    #[error("Suffix list contains no rules")]
    Empty,
}

/// Looks up the registrable domain (eTLD+1) of a host.
pub trait SuffixResolver {
    /// Returns `Ok(None)` when the host has no registrable domain, e.g. it is
    /// a single label or a public suffix itself. Malformed hosts are errors.
    fn registrable_domain(&self, host: &str) -> Result<Option<String>, SuffixError>;
}

impl<R: SuffixResolver + ?Sized> SuffixResolver for &R {
    fn registrable_domain(&self, host: &str) -> Result<Option<String>, SuffixError> {
        (**self).registrable_domain(host)
    }
}

// =============================================================================
// Host Validation
// =============================================================================

/// Lowercase and validate a host before lookup.
fn normalize_host(host: &str) -> Result<String, SuffixError> {
    let host = host.trim_end_matches('.').to_lowercase();
    if host.is_empty() {
        return Err(SuffixError::EmptyHost);
    }
    if host.len() > MAX_HOST_LEN {
        return Err(SuffixError::HostTooLong(host.len()));
    }

    for label in host.split('.') {
        if label.is_empty() {
            return Err(SuffixError::EmptyLabel(host.clone()));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(SuffixError::LabelTooLong(host.clone()));
        }
        if let Some(ch) = label
            .chars()
            .find(|&c| !(c.is_alphanumeric() || c == '-' || c == '_'))
        {
            return Err(SuffixError::InvalidCharacter { host: host.clone(), ch });
        }
    }

    Ok(host)
}

// =============================================================================
// Loaded Suffix Table
// =============================================================================

/// PSL rule sets for suffix lookup.
#[derive(Debug, Default, Clone)]
pub struct SuffixTable {
    /// Exact rules (e.g., "com", "co.uk")
    exact: HashSet<String>,
    /// Wildcard rules (e.g., "*.ck" stored as "ck")
    wildcard: HashSet<String>,
    /// Exception rules (e.g., "!www.ck" stored as "www.ck")
    exception: HashSet<String>,
}

impl SuffixTable {
    /// Create an empty table. Lookups fall back to a simple heuristic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse PSL text. Comments (`//`) and section markers are skipped; only
    /// the first whitespace-delimited token of each line is used.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let rule = match line.split_whitespace().next() {
                Some(rule) => rule.to_lowercase(),
                None => continue,
            };

            if let Some(rest) = rule.strip_prefix('!') {
                table.exception.insert(rest.to_string());
            } else if let Some(rest) = rule.strip_prefix("*.") {
                table.wildcard.insert(rest.to_string());
            } else {
                table.exact.insert(rule);
            }
        }

        table
    }

    /// Load a PSL file such as `public_suffix_list.dat`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SuffixTableError> {
        let text = fs::read_to_string(path)?;
        let table = Self::parse(&text);
        if table.is_empty() {
            return Err(SuffixTableError::Empty);
        }
        log::debug!(
            "Loaded suffix table: {} exact, {} wildcard, {} exception rules",
            table.exact.len(),
            table.wildcard.len(),
            table.exception.len()
        );
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard.is_empty() && self.exception.is_empty()
    }

    /// Compute the eTLD+1 of an already normalized host.
    fn compute_etld1(&self, host: &str) -> Option<String> {
        let labels: Vec<&str> = host.split('.').collect();
        let n = labels.len();

        if n <= 1 {
            return None;
        }

        if self.is_empty() {
            return fallback_etld1(&labels);
        }

        // Longest suffix first, so the first hit is the prevailing rule.
        for i in 0..n {
            let suffix = labels[i..].join(".");

            // Exception rules override wildcards: the suffix minus its first
            // label is public, so the suffix itself is registrable.
            if self.exception.contains(&suffix) {
                return Some(suffix);
            }

            let parent_is_wildcard = i + 1 < n && self.wildcard.contains(&labels[i + 1..].join("."));
            if self.exact.contains(&suffix) || parent_is_wildcard {
                if i == 0 {
                    return None;
                }
                return Some(labels[i - 1..].join("."));
            }
        }

        // Default rule "*": the last label is the public suffix.
        Some(labels[n - 2..].join("."))
    }
}

impl SuffixResolver for SuffixTable {
    fn registrable_domain(&self, host: &str) -> Result<Option<String>, SuffixError> {
        let host = normalize_host(host)?;
        Ok(self.compute_etld1(&host))
    }
}

/// Common two-part TLDs for fallback.
const COMMON_TWO_PART_TLDS: &[&str] = &[
    "co.uk", "co.jp", "co.nz", "co.za", "co.in", "co.kr",
    "com.au", "com.br", "com.cn", "com.mx", "com.tw", "com.hk",
    "net.au", "net.nz", "net.cn",
    "org.uk", "org.au", "org.cn",
    "gov.uk", "gov.au",
    "ac.uk", "ac.jp",
    "ne.jp", "or.jp",
];

/// Fallback eTLD+1 heuristic used when no suffix rules are loaded.
fn fallback_etld1(labels: &[&str]) -> Option<String> {
    let n = labels.len();
    if n < 2 {
        return None;
    }

    let last_two = labels[n - 2..].join(".");
    if COMMON_TWO_PART_TLDS.contains(&last_two.as_str()) {
        if n == 2 {
            return None;
        }
        return Some(labels[n - 3..].join("."));
    }

    Some(last_two)
}

// =============================================================================
// Built-in Suffix List
// =============================================================================

/// Resolver backed by the suffix list compiled into the `psl` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSuffixes;

impl SuffixResolver for BuiltinSuffixes {
    fn registrable_domain(&self, host: &str) -> Result<Option<String>, SuffixError> {
        let host = normalize_host(host)?;
        Ok(::psl::domain_str(&host).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNTHETIC_PSL: &str = "\
// ===BEGIN ICANN DOMAINS===
com
uk
co.uk
// wildcard with exception
*.ck
!www.ck
// ===END ICANN DOMAINS===
";

    fn lookup(table: &SuffixTable, host: &str) -> Option<String> {
        table.registrable_domain(host).unwrap()
    }

    #[test]
    fn test_exact_rules() {
        let table = SuffixTable::parse(SYNTHETIC_PSL);
        assert_eq!(lookup(&table, "example.com").as_deref(), Some("example.com"));
        assert_eq!(lookup(&table, "a.b.example.com").as_deref(), Some("example.com"));
        assert_eq!(lookup(&table, "www.example.co.uk").as_deref(), Some("example.co.uk"));
    }

    #[test]
    fn test_public_suffix_has_no_domain() {
        let table = SuffixTable::parse(SYNTHETIC_PSL);
        assert_eq!(lookup(&table, "co.uk"), None);
        assert_eq!(lookup(&table, "com"), None);
    }

    #[test]
    fn test_wildcard_and_exception_rules() {
        let table = SuffixTable::parse(SYNTHETIC_PSL);
        assert_eq!(lookup(&table, "a.foo.ck").as_deref(), Some("a.foo.ck"));
        assert_eq!(lookup(&table, "foo.ck"), None);
        assert_eq!(lookup(&table, "www.ck").as_deref(), Some("www.ck"));
        assert_eq!(lookup(&table, "a.www.ck").as_deref(), Some("www.ck"));
    }

    #[test]
    fn test_unlisted_suffix_uses_default_rule() {
        let table = SuffixTable::parse(SYNTHETIC_PSL);
        assert_eq!(lookup(&table, "a.example.test").as_deref(), Some("example.test"));
    }

    #[test]
    fn test_host_is_normalized() {
        let table = SuffixTable::parse(SYNTHETIC_PSL);
        assert_eq!(lookup(&table, "WWW.Example.COM.").as_deref(), Some("example.com"));
    }

    #[test]
    fn test_invalid_hosts_are_errors() {
        let table = SuffixTable::parse(SYNTHETIC_PSL);
        assert_eq!(table.registrable_domain(""), Err(SuffixError::EmptyHost));
        assert!(matches!(
            table.registrable_domain("a..com"),
            Err(SuffixError::EmptyLabel(_))
        ));
        assert!(matches!(
            table.registrable_domain("google.(com|net)"),
            Err(SuffixError::InvalidCharacter { ch: '(', .. })
        ));
        let long_label = format!("{}.com", "a".repeat(64));
        assert!(matches!(
            table.registrable_domain(&long_label),
            Err(SuffixError::LabelTooLong(_))
        ));
    }

    #[test]
    fn test_fallback_etld1_simple() {
        let table = SuffixTable::new();
        assert_eq!(lookup(&table, "example.com").as_deref(), Some("example.com"));
        assert_eq!(lookup(&table, "sub.example.com").as_deref(), Some("example.com"));
        assert_eq!(lookup(&table, "localhost"), None);
    }

    #[test]
    fn test_fallback_etld1_two_part() {
        let table = SuffixTable::new();
        assert_eq!(lookup(&table, "sub.example.co.uk").as_deref(), Some("example.co.uk"));
        assert_eq!(lookup(&table, "example.co.uk").as_deref(), Some("example.co.uk"));
        assert_eq!(lookup(&table, "co.uk"), None);
    }

    #[test]
    fn test_builtin_suffixes() {
        let psl = BuiltinSuffixes;
        assert_eq!(
            psl.registrable_domain("www.example.co.uk").unwrap().as_deref(),
            Some("example.co.uk")
        );
        assert_eq!(
            psl.registrable_domain("ads.google.com").unwrap().as_deref(),
            Some("google.com")
        );
    }

    #[test]
    fn test_resolver_through_reference() {
        fn resolve<R: SuffixResolver>(resolver: R, host: &str) -> Option<String> {
            resolver.registrable_domain(host).ok().flatten()
        }
        let table = SuffixTable::parse(SYNTHETIC_PSL);
        assert_eq!(resolve(&table, "x.example.com").as_deref(), Some("example.com"));
    }
}
