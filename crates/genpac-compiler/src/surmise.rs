//! Registrable-domain extraction from rule lines
//!
//! Precise mode reduces every rule to the eTLD+1 it most likely targets. Rules
//! are free-form (wildcards, anchors, encoded paths, whole URLs), so the host is
//! recovered in three stages:
//!
//! 1. strip decoration with the ordered [`DECORATION`] rewrite table
//! 2. pull out a host-like substring
//! 3. ask a [`SuffixResolver`] for the registrable domain
//!
//! Every stage degrades to `None` instead of failing.

use std::borrow::Cow;

use genpac_core::psl::SuffixResolver;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

static SEGMENT_WILDCARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/[a-zA-Z0-9]+\*\.").expect("valid regex"));
static WILDCARD_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*[a-zA-Z0-9_%]+").expect("valid regex"));
static LEADING_WORD_WILDCARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_%]+\*").expect("valid regex"));
static ALTERNATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*)\.\(((?:[a-zA-Z0-9.-]+\|)+[a-zA-Z0-9.-]+)\)")
        .expect("valid regex")
});

// =============================================================================
// Decoration Rewrites
// =============================================================================

/// One textual rewrite applied while stripping a rule down to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// `|` at either end, `^` separators at the end
    TrimAnchors,
    /// `*` at either end
    TrimAsterisks,
    /// `/*.` -> `/`
    CollapseSlashWildcard,
    /// `/segment*.` -> `/`
    CollapseSegmentWildcard,
    /// `*word` -> nothing
    DropWildcardWord,
    /// leading `word*` -> nothing
    DropLeadingWordWildcard,
    /// `.` at the start
    TrimLeadingDots,
}

/// Rewrites in the order they are applied.
pub const DECORATION: &[Rewrite] = &[
    Rewrite::TrimAnchors,
    Rewrite::TrimAsterisks,
    Rewrite::CollapseSlashWildcard,
    Rewrite::CollapseSegmentWildcard,
    Rewrite::DropWildcardWord,
    Rewrite::DropLeadingWordWildcard,
    Rewrite::TrimLeadingDots,
];

impl Rewrite {
    pub fn apply<'a>(&self, rule: &'a str) -> Cow<'a, str> {
        match self {
            Self::TrimAnchors => Cow::Borrowed(
                rule.trim_start_matches('|')
                    .trim_end_matches(|c: char| c == '|' || c == '^'),
            ),
            Self::TrimAsterisks => Cow::Borrowed(rule.trim_matches('*')),
            Self::CollapseSlashWildcard => {
                if rule.contains("/*.") {
                    Cow::Owned(rule.replace("/*.", "/"))
                } else {
                    Cow::Borrowed(rule)
                }
            }
            Self::CollapseSegmentWildcard => SEGMENT_WILDCARD.replace_all(rule, "/"),
            Self::DropWildcardWord => WILDCARD_WORD.replace_all(rule, ""),
            Self::DropLeadingWordWildcard => LEADING_WORD_WILDCARD.replace(rule, ""),
            Self::TrimLeadingDots => Cow::Borrowed(rule.trim_start_matches('.')),
        }
    }
}

/// Run the whole [`DECORATION`] table over a rule.
pub fn strip_decoration(rule: &str) -> String {
    DECORATION
        .iter()
        .fold(rule.to_string(), |acc, step| step.apply(&acc).into_owned())
}

// =============================================================================
// Host Extraction
// =============================================================================

fn has_encoded_slash(rule: &str) -> bool {
    rule.contains("%2F") || rule.contains("%2f")
}

fn url_host(input: &str) -> Option<String> {
    Url::parse(input)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

/// Pull a host-like substring out of a stripped rule.
pub fn extract_host(rule: &str) -> Option<String> {
    if rule.starts_with("http:") || rule.starts_with("https:") {
        return url_host(rule);
    }

    if let Some(slash) = rule.find('/') {
        let paren_before_slash = rule.find('(').map_or(false, |paren| paren < slash);
        if paren_before_slash || rule.contains("*/") {
            return Some(rule[..slash].to_string());
        }
        return url_host(&format!("http://{}", rule));
    }

    if rule.contains('.') {
        return Some(rule.to_string());
    }

    None
}

// =============================================================================
// Domain Resolution
// =============================================================================

fn is_ipv4_literal(host: &str) -> bool {
    let parts: Vec<&str> = host.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Resolve a host to its registrable domain.
pub fn registrable_domain<R>(host: &str, resolver: &R) -> Option<String>
where
    R: SuffixResolver + ?Sized,
{
    if is_ipv4_literal(host) {
        return None;
    }

    match resolver.registrable_domain(host) {
        Ok(Some(domain)) if domain.contains('.') && !domain.ends_with('.') => Some(domain),
        Ok(_) => None,
        Err(e) => {
            log::trace!("No domain for host '{}': {}", host, e);
            None
        }
    }
}

/// Guess the registrable domain a rule targets.
pub fn surmise_domain<R>(rule: &str, resolver: &R) -> Option<String>
where
    R: SuffixResolver + ?Sized,
{
    let stripped = strip_decoration(rule);
    let decoded = if has_encoded_slash(&stripped) {
        percent_decode_str(&stripped).decode_utf8_lossy().into_owned()
    } else {
        stripped
    };

    let host = extract_host(&decoded)?;
    let domain = registrable_domain(&host, resolver);
    log::trace!("surmise: {} => {:?}", rule, domain);
    domain
}

/// Expand the first `prefix.(alt1|alt2|...)` group of a rule body.
///
/// `google.(com|co.jp)/search` yields `google.com/search` and
/// `google.co.jp/search`. Returns `None` when the body has no such group.
pub fn expand_alternation(body: &str) -> Option<Vec<String>> {
    let caps = ALTERNATION.captures(body)?;
    let whole = caps.get(0)?;
    let prefix = caps.get(1)?.as_str();
    let rest = &body[whole.end()..];

    let expanded = caps
        .get(2)?
        .as_str()
        .split('|')
        .map(|alt| format!("{}.{}{}", prefix, alt, rest))
        .collect();

    Some(expanded)
}
