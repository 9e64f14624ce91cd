//! Standard mode: one pattern per rule line, in input order.

use genpac_core::types::CompiledRuleSet;

use crate::classifier::classify;

/// Counts from one standard compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardStats {
    pub lines: usize,
    /// Blank and comment lines.
    pub skipped: usize,
    pub patterns: usize,
}

/// Compile rule lines into four ordered pattern lists.
///
/// Input order is preserved inside each list; nothing is deduplicated.
pub fn compile_standard<I, S>(lines: I) -> CompiledRuleSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    compile_standard_with_stats(lines).0
}

pub fn compile_standard_with_stats<I, S>(lines: I) -> (CompiledRuleSet, StandardStats)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut rules = CompiledRuleSet::new();
    let mut total = 0usize;
    let mut skipped = 0usize;

    for line in lines {
        total += 1;
        match classify(line.as_ref()) {
            Some(classified) => rules.push(classified),
            None => skipped += 1,
        }
    }

    let stats = StandardStats {
        lines: total,
        skipped,
        patterns: rules.len(),
    };

    log::debug!(
        "Standard compile: {} lines, {} skipped, {} direct regexp, {} direct wildcard, {} proxy regexp, {} proxy wildcard",
        stats.lines,
        stats.skipped,
        rules.direct_regexp.len(),
        rules.direct_wildcard.len(),
        rules.proxy_regexp.len(),
        rules.proxy_wildcard.len(),
    );

    (rules, stats)
}
