//! Core type definitions for genpac
//!
//! These types describe what the compilers hand to the PAC template:
//! ordered pattern lists in standard mode, sorted domain sets in precise mode.

use serde::ser::{Serialize, SerializeTuple, Serializer};

// =============================================================================
// Classified Patterns
// =============================================================================

/// Where a matching request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Exception rule (@@...) - bypass the proxy
    Direct,
    /// Regular rule - use the proxy
    Proxy,
}

/// How the downstream evaluator matches a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternForm {
    /// `*`-delimited glob for `shExpMatch`
    Wildcard,
    /// Regular expression source for `RegExp`
    Regexp,
}

/// One rule line after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPattern {
    pub bucket: Bucket,
    pub form: PatternForm,
    pub pattern: String,
}

// =============================================================================
// Standard Mode Output
// =============================================================================

/// Four ordered pattern lists. Order is input order: the evaluator stops at
/// the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledRuleSet {
    pub direct_regexp: Vec<String>,
    pub direct_wildcard: Vec<String>,
    pub proxy_regexp: Vec<String>,
    pub proxy_wildcard: Vec<String>,
}

impl CompiledRuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a classified pattern to the list it belongs to.
    pub fn push(&mut self, classified: ClassifiedPattern) {
        self.list_mut(classified.bucket, classified.form)
            .push(classified.pattern);
    }

    fn list_mut(&mut self, bucket: Bucket, form: PatternForm) -> &mut Vec<String> {
        match (bucket, form) {
            (Bucket::Direct, PatternForm::Regexp) => &mut self.direct_regexp,
            (Bucket::Direct, PatternForm::Wildcard) => &mut self.direct_wildcard,
            (Bucket::Proxy, PatternForm::Regexp) => &mut self.proxy_regexp,
            (Bucket::Proxy, PatternForm::Wildcard) => &mut self.proxy_wildcard,
        }
    }

    /// Total number of patterns across all four lists.
    pub fn len(&self) -> usize {
        self.direct_regexp.len()
            + self.direct_wildcard.len()
            + self.proxy_regexp.len()
            + self.proxy_wildcard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serialized as `[directRegexp, directWildcard, proxyRegexp, proxyWildcard]`,
/// the shape the PAC template indexes into.
impl Serialize for CompiledRuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.direct_regexp)?;
        tuple.serialize_element(&self.direct_wildcard)?;
        tuple.serialize_element(&self.proxy_regexp)?;
        tuple.serialize_element(&self.proxy_wildcard)?;
        tuple.end()
    }
}

// =============================================================================
// Precise Mode Output
// =============================================================================

/// Registrable domains split into direct and proxy sets.
///
/// Built by the precise compiler: both lists sorted ascending, no duplicates,
/// and no domain present in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledDomainSet {
    pub direct: Vec<String>,
    pub proxy: Vec<String>,
}

impl CompiledDomainSet {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.proxy.is_empty()
    }
}

/// Serialized as `[direct, proxy]`.
impl Serialize for CompiledDomainSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.direct)?;
        tuple.serialize_element(&self.proxy)?;
        tuple.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_routes_to_bucket_and_form() {
        let mut set = CompiledRuleSet::new();
        set.push(ClassifiedPattern {
            bucket: Bucket::Direct,
            form: PatternForm::Wildcard,
            pattern: "*a*".to_string(),
        });
        set.push(ClassifiedPattern {
            bucket: Bucket::Proxy,
            form: PatternForm::Regexp,
            pattern: "^b$".to_string(),
        });

        assert_eq!(set.direct_wildcard, ["*a*"]);
        assert_eq!(set.proxy_regexp, ["^b$"]);
        assert!(set.direct_regexp.is_empty());
        assert!(set.proxy_wildcard.is_empty());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rule_set_serializes_as_four_lists() {
        let set = CompiledRuleSet {
            direct_regexp: vec!["a".to_string()],
            direct_wildcard: vec![],
            proxy_regexp: vec![],
            proxy_wildcard: vec!["*b*".to_string()],
        };
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[["a"],[],[],["*b*"]]"#);
    }

    #[test]
    fn domain_set_serializes_as_pair() {
        let set = CompiledDomainSet {
            direct: vec!["a.com".to_string()],
            proxy: vec!["b.com".to_string(), "c.com".to_string()],
        };
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[["a.com"],["b.com","c.com"]]"#);
    }

    #[test]
    fn empty_sets_serialize_as_empty_lists() {
        assert_eq!(serde_json::to_string(&CompiledRuleSet::new()).unwrap(), "[[],[],[],[]]");
        assert_eq!(serde_json::to_string(&CompiledDomainSet::default()).unwrap(), "[[],[]]");
    }
}
