//! Precise mode: reduce every rule to the registrable domain it targets.
//!
//! User and list rules are pooled into two sorted sets. The PAC template then
//! walks a request host's parent domains against them.

use std::collections::BTreeSet;

use genpac_core::lines::{is_ignored, trim_line};
use genpac_core::psl::SuffixResolver;
use genpac_core::types::{Bucket, CompiledDomainSet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classifier::regex_literal;
use crate::surmise::{expand_alternation, surmise_domain};

/// First `label.` run inside an unescaped regex body.
static HOST_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+\..*").expect("valid regex"));

/// Counts from one precise compile, logged at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreciseStats {
    /// Rule lines, comments and blanks excluded.
    pub lines: usize,
    /// Rule lines that named no resolvable domain.
    pub unresolved: usize,
    pub direct: usize,
    pub proxy: usize,
    /// Direct domains dropped because the proxy set also has them.
    pub overridden: usize,
}

#[derive(Default)]
struct DomainSets {
    direct: BTreeSet<String>,
    proxy: BTreeSet<String>,
    lines: usize,
    unresolved: usize,
}

impl DomainSets {
    fn collect<I, S, R>(&mut self, lines: I, resolver: &R)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: SuffixResolver + ?Sized,
    {
        for line in lines {
            let Some((bucket, domains)) = line_domains(line.as_ref(), resolver) else {
                continue;
            };
            self.lines += 1;
            if domains.is_empty() {
                self.unresolved += 1;
            }
            let target = match bucket {
                Bucket::Direct => &mut self.direct,
                Bucket::Proxy => &mut self.proxy,
            };
            target.extend(domains);
        }
    }
}

/// Compile both rule sources into sorted direct/proxy domain sets.
///
/// The sources are pooled, so neither source order nor user-rule precedence
/// survives. A domain found on both sides is proxied.
pub fn compile_precise<U, L, S, T, R>(user_lines: U, list_lines: L, resolver: &R) -> CompiledDomainSet
where
    U: IntoIterator<Item = S>,
    L: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
    R: SuffixResolver + ?Sized,
{
    compile_precise_with_stats(user_lines, list_lines, resolver).0
}

pub fn compile_precise_with_stats<U, L, S, T, R>(
    user_lines: U,
    list_lines: L,
    resolver: &R,
) -> (CompiledDomainSet, PreciseStats)
where
    U: IntoIterator<Item = S>,
    L: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
    R: SuffixResolver + ?Sized,
{
    let mut sets = DomainSets::default();
    sets.collect(user_lines, resolver);
    sets.collect(list_lines, resolver);

    let DomainSets { mut direct, proxy, lines, unresolved } = sets;
    let before = direct.len();
    direct.retain(|domain| !proxy.contains(domain));

    let stats = PreciseStats {
        lines,
        unresolved,
        direct: direct.len(),
        proxy: proxy.len(),
        overridden: before - direct.len(),
    };

    log::debug!(
        "Precise compile: {} rules, {} unresolved, {} direct, {} proxy, {} direct overridden by proxy",
        stats.lines,
        stats.unresolved,
        stats.direct,
        stats.proxy,
        stats.overridden,
    );

    let domains = CompiledDomainSet {
        direct: direct.into_iter().collect(),
        proxy: proxy.into_iter().collect(),
    };

    (domains, stats)
}

/// Domains one rule line contributes, with the bucket they go to.
///
/// `None` for blank and comment lines; an empty list when no domain could be
/// determined.
pub fn line_domains<R>(line: &str, resolver: &R) -> Option<(Bucket, Vec<String>)>
where
    R: SuffixResolver + ?Sized,
{
    let line = trim_line(line);
    if is_ignored(line) {
        return None;
    }

    if let Some(rest) = line.strip_prefix("@@") {
        let rest = rest.trim_start_matches(|c: char| c == '@' || c == '|' || c == '.');
        return Some((Bucket::Direct, rule_domains(rest, resolver)));
    }

    if line.starts_with('/') || line.contains(".*") {
        return Some((Bucket::Proxy, regex_domains(line, resolver)));
    }

    let rest = line.trim_start_matches('|');
    Some((Bucket::Proxy, rule_domains(rest, resolver)))
}

/// Domains named by a plain rule, one per branch of a `name.(a|b)` group.
fn rule_domains<R>(rule: &str, resolver: &R) -> Vec<String>
where
    R: SuffixResolver + ?Sized,
{
    match expand_alternation(rule) {
        Some(candidates) => surmise_each(&candidates, resolver),
        None => surmise_domain(rule, resolver).into_iter().collect(),
    }
}

fn surmise_each<R>(candidates: &[String], resolver: &R) -> Vec<String>
where
    R: SuffixResolver + ?Sized,
{
    candidates
        .iter()
        .filter_map(|candidate| surmise_domain(candidate, resolver))
        .collect()
}

/// Domains named by a regex-style rule.
fn regex_domains<R>(line: &str, resolver: &R) -> Vec<String>
where
    R: SuffixResolver + ?Sized,
{
    let body = regex_literal(line).unwrap_or(line);
    let unescaped = body.replace(r"\/", "/").replace(r"\.", ".");

    if let Some(candidates) = expand_alternation(&unescaped) {
        return surmise_each(&candidates, resolver);
    }

    HOST_RUN
        .find(&unescaped)
        .and_then(|m| surmise_domain(m.as_str(), resolver))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genpac_core::psl::SuffixTable;

    fn table() -> SuffixTable {
        SuffixTable::parse("com\nnet\norg\njp\nco.jp\nuk\nco.uk\n")
    }

    fn compile(user: &[&str], list: &[&str]) -> CompiledDomainSet {
        compile_precise(user.iter(), list.iter(), &table())
    }

    #[test]
    fn empty_sources_give_empty_sets() {
        let domains = compile(&[], &[]);
        assert!(domains.direct.is_empty());
        assert!(domains.proxy.is_empty());
    }

    #[test]
    fn proxy_wins_over_direct() {
        let domains = compile(&["@@safe.example.com"], &["ad.example.com"]);
        assert!(domains.direct.is_empty());
        assert_eq!(domains.proxy, vec!["example.com"]);

        let domains = compile(&[], &["||example.com", "@@||cdn.example.com"]);
        assert!(domains.direct.is_empty());
        assert_eq!(domains.proxy, vec!["example.com"]);
    }

    #[test]
    fn sorted_and_deduplicated() {
        let domains = compile(&[], &["b.com", "a.com", "a.com"]);
        assert_eq!(domains.proxy, vec!["a.com", "b.com"]);
    }

    #[test]
    fn sources_are_pooled() {
        let domains = compile(
            &["||user.net", "@@||direct.org"],
            &["||list.com", "@@||other.co.uk"],
        );
        assert_eq!(domains.direct, vec!["direct.org", "other.co.uk"]);
        assert_eq!(domains.proxy, vec!["list.com", "user.net"]);
    }

    #[test]
    fn skips_comments_and_unresolvable_rules() {
        let domains = compile(&[], &["! ||comment.com", "", "1.2.3.4", "localhost", "/search?q="]);
        assert!(domains.proxy.is_empty());
    }

    #[test]
    fn exception_prefix_characters_are_stripped() {
        assert_eq!(
            line_domains("@@|||.www.example.com^", &table()),
            Some((Bucket::Direct, vec!["example.com".to_string()]))
        );
        assert_eq!(
            line_domains("@@|https://www.example.co.jp/path", &table()),
            Some((Bucket::Direct, vec!["example.co.jp".to_string()]))
        );
    }

    #[test]
    fn regex_rules_use_first_host_run() {
        assert_eq!(
            line_domains(r"/^https?:\/\/[^\/]+example\.com\/ads/", &table()),
            Some((Bucket::Proxy, vec!["example.com".to_string()]))
        );
        assert_eq!(
            line_domains(r"/^https?:\/\/www\.example\.net\/.*/", &table()),
            Some((Bucket::Proxy, vec!["example.net".to_string()]))
        );
    }

    #[test]
    fn regex_alternation_yields_several_domains() {
        assert_eq!(
            line_domains(r"/^https?:\/\/([^\/]+\.)*google\.(com|co\.jp|co\.uk)\//", &table()),
            Some((
                Bucket::Proxy,
                vec![
                    "google.com".to_string(),
                    "google.co.jp".to_string(),
                    "google.co.uk".to_string(),
                ]
            ))
        );
    }

    #[test]
    fn plain_rule_alternation_yields_each_branch() {
        assert_eq!(
            line_domains("||google.(com|net)/search", &table()),
            Some((Bucket::Proxy, vec!["google.com".to_string(), "google.net".to_string()]))
        );
        assert_eq!(
            line_domains("@@||cdn.example.(com|org)/", &table()),
            Some((Bucket::Direct, vec!["example.com".to_string(), "example.org".to_string()]))
        );
    }

    #[test]
    fn alternation_branches_are_pooled_and_sorted() {
        let domains = compile(&[], &["www.google.(net|com)/search", "||google.com"]);
        assert_eq!(domains.proxy, vec!["google.com", "google.net"]);
    }

    #[test]
    fn comment_lines_yield_nothing() {
        assert_eq!(line_domains("!@@||example.com", &table()), None);
        assert_eq!(line_domains("  ", &table()), None);
    }

    #[test]
    fn stats_report_overrides() {
        let (domains, stats) = compile_precise_with_stats(
            ["@@||a.com", "@@||b.com"],
            ["||a.com", "localhost"],
            &table(),
        );
        assert_eq!(domains.direct, vec!["b.com"]);
        assert_eq!(domains.proxy, vec!["a.com"]);
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.unresolved, 1);
        assert_eq!(stats.overridden, 1);
    }
}
