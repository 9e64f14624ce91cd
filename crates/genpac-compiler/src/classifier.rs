//! Rule line classification into bucket, form and pattern text.

use genpac_core::lines::{is_ignored, trim_line};
use genpac_core::types::{Bucket, ClassifiedPattern, PatternForm};

use crate::wildcard::wildcard_to_regex;

/// Matches the end of the URL or any character that cannot be part of a
/// host, path segment or query value.
pub const SEPARATOR_CLASS: &str = r"(?:[^\w\-.%\u0080-\uFFFF]|$)";

/// Prepended to `||` rules: a URI scheme, then an optional run of subdomain
/// labels, then the rule body.
pub const DOMAIN_ANCHOR_PREFIX: &str = r"^[\w\-]+:/+(?!/)(?:[^/]+\.)?";

/// Classify one rule line.
///
/// Returns `None` for blank lines and `!` comments. Anything else produces a
/// pattern; lines that fit no specific syntax become plain wildcards.
pub fn classify(line: &str) -> Option<ClassifiedPattern> {
    let line = trim_line(line);
    if is_ignored(line) {
        return None;
    }

    let (bucket, body) = match line.strip_prefix("@@") {
        Some(rest) => (Bucket::Direct, rest),
        None => (Bucket::Proxy, line),
    };

    let (form, pattern) = if let Some(regex) = regex_literal(body) {
        (PatternForm::Regexp, regex.to_string())
    } else if body.contains('^') {
        let pattern = wildcard_to_regex(body).replace(r"\^", SEPARATOR_CLASS);
        (PatternForm::Regexp, pattern)
    } else if let Some(rest) = body.strip_prefix("||") {
        (PatternForm::Regexp, format!("{}{}", DOMAIN_ANCHOR_PREFIX, wildcard_to_regex(rest)))
    } else if body.starts_with('|') || body.ends_with('|') {
        (PatternForm::Regexp, anchor_edges(&wildcard_to_regex(body)))
    } else {
        (PatternForm::Wildcard, format!("*{}*", body.trim_matches('*')))
    };

    log::trace!("{:?}/{:?}: {} => {}", bucket, form, line, pattern);

    Some(ClassifiedPattern { bucket, form, pattern })
}

/// Body of a `/regex/` line. A lone `/` opens and closes an empty regex.
pub(crate) fn regex_literal(body: &str) -> Option<&str> {
    if !(body.starts_with('/') && body.ends_with('/')) {
        return None;
    }
    Some(body.get(1..body.len() - 1).unwrap_or(""))
}

/// Turn escaped edge pipes into `^` / `$` anchors.
fn anchor_edges(escaped: &str) -> String {
    let start = escaped.strip_prefix(r"\|");
    let body = start.unwrap_or(escaped);
    let end = body.strip_suffix(r"\|");
    let body = end.unwrap_or(body);

    let mut out = String::with_capacity(escaped.len());
    if start.is_some() {
        out.push('^');
    }
    out.push_str(body);
    if end.is_some() {
        out.push('$');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(line: &str) -> (Bucket, PatternForm, String) {
        let c = classify(line).expect("line should classify");
        (c.bucket, c.form, c.pattern)
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   "), None);
        assert_eq!(classify(" \"\" "), None);
        assert_eq!(classify("! comment"), None);
        assert_eq!(classify("!||example.com^"), None);
    }

    #[test]
    fn regex_literal_is_kept() {
        assert_eq!(
            pattern("/foo.*bar/"),
            (Bucket::Proxy, PatternForm::Regexp, "foo.*bar".to_string())
        );
    }

    #[test]
    fn regex_literal_wins_over_caret() {
        assert_eq!(pattern(r"/^https?:\/\/x/").2, r"^https?:\/\/x");
    }

    #[test]
    fn single_slash_is_an_empty_regex() {
        assert_eq!(pattern("/"), (Bucket::Proxy, PatternForm::Regexp, String::new()));
        assert_eq!(pattern("@@//"), (Bucket::Direct, PatternForm::Regexp, String::new()));
    }

    #[test]
    fn exception_goes_direct() {
        let (bucket, form, _) = pattern("@@||example.com^");
        assert_eq!(bucket, Bucket::Direct);
        assert_eq!(form, PatternForm::Regexp);
    }

    #[test]
    fn caret_becomes_separator_class() {
        assert_eq!(
            pattern("example.com^").2,
            format!(r"example\.com{}", SEPARATOR_CLASS)
        );
    }

    #[test]
    fn caret_takes_priority_over_domain_anchor() {
        // The pipes are escaped like any other character on this branch.
        assert_eq!(
            pattern("||example.com^").2,
            format!(r"\|\|example\.com{}", SEPARATOR_CLASS)
        );
    }

    #[test]
    fn domain_anchor_gets_scheme_prefix() {
        assert_eq!(
            pattern("||ads.example.com").2,
            format!(r"{}ads\.example\.com", DOMAIN_ANCHOR_PREFIX)
        );
        assert_eq!(
            pattern("||example.com/*.js").2,
            format!(r"{}example\.com/.*\.js", DOMAIN_ANCHOR_PREFIX)
        );
    }

    #[test]
    fn edge_pipes_become_anchors() {
        assert_eq!(pattern("|http://example.com").2, r"^http://example\.com");
        assert_eq!(pattern("example.com/ad.js|").2, r"example\.com/ad\.js$");
        assert_eq!(pattern("|http://a.com/|").2, r"^http://a\.com/$");
    }

    #[test]
    fn inner_pipes_stay_escaped() {
        assert_eq!(pattern("|a|b").2, r"^a\|b");
    }

    #[test]
    fn plain_rule_is_wrapped_wildcard() {
        assert_eq!(
            pattern("example.com"),
            (Bucket::Proxy, PatternForm::Wildcard, "*example.com*".to_string())
        );
        assert_eq!(pattern("**example.com*").2, "*example.com*");
        assert_eq!(
            pattern("@@.example.com/path"),
            (Bucket::Direct, PatternForm::Wildcard, "*.example.com/path*".to_string())
        );
    }

    #[test]
    fn line_is_trimmed_before_classification() {
        assert_eq!(pattern("  example.com \r").2, "*example.com*");
    }
}
