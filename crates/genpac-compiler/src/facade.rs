//! Mode selection over the two compilers and JSON output for the template.

use genpac_core::psl::SuffixResolver;
use genpac_core::types::{CompiledDomainSet, CompiledRuleSet};
use serde::ser::{Serialize, SerializeTuple, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::precise::compile_precise;
use crate::standard::compile_standard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Ordered regexp/wildcard lists per source
    #[default]
    Standard,
    /// Sorted registrable-domain sets
    Precise,
}

/// Compiler output handed to the PAC template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledRules {
    /// User rules first, so they are evaluated before the list.
    Standard {
        user: CompiledRuleSet,
        list: CompiledRuleSet,
    },
    Precise(CompiledDomainSet),
}

impl CompiledRules {
    pub fn mode(&self) -> CompileMode {
        match self {
            Self::Standard { .. } => CompileMode::Standard,
            Self::Precise(_) => CompileMode::Precise,
        }
    }

    /// No pattern or domain in either source.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Standard { user, list } => user.is_empty() && list.is_empty(),
            Self::Precise(domains) => domains.is_empty(),
        }
    }

    /// Serialize for embedding in the PAC script.
    ///
    /// Compressed output has no whitespace; otherwise it is indented with four
    /// spaces.
    pub fn to_json(&self, compress: bool) -> Result<String, serde_json::Error> {
        if compress {
            return serde_json::to_string(self);
        }

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// `[user, list]` in standard mode, `[direct, proxy]` in precise mode.
impl Serialize for CompiledRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Standard { user, list } => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(user)?;
                tuple.serialize_element(list)?;
                tuple.end()
            }
            Self::Precise(domains) => domains.serialize(serializer),
        }
    }
}

/// Compile both rule sources with the selected compiler.
///
/// The resolver is only consulted in precise mode.
pub fn compile_rules<S, T, R>(
    mode: CompileMode,
    user_lines: &[S],
    list_lines: &[T],
    resolver: &R,
) -> CompiledRules
where
    S: AsRef<str>,
    T: AsRef<str>,
    R: SuffixResolver + ?Sized,
{
    match mode {
        CompileMode::Standard => CompiledRules::Standard {
            user: compile_standard(user_lines),
            list: compile_standard(list_lines),
        },
        CompileMode::Precise => {
            CompiledRules::Precise(compile_precise(user_lines, list_lines, resolver))
        }
    }
}
