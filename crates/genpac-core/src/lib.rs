//! genpac Core Library
//!
//! Shared building blocks for the genpac rule compiler.
//!
//! # Modules
//!
//! - `lines`: Unicode-aware line splitting and per-line trimming
//! - `psl`: Public Suffix List lookup for eTLD+1 extraction
//! - `types`: Compiled rule and domain set definitions

pub mod lines;
pub mod psl;
pub mod types;

// Re-export commonly used types
pub use lines::{split_lines, trim_line};
pub use self::psl::{BuiltinSuffixes, SuffixError, SuffixResolver, SuffixTable, SuffixTableError};
pub use types::{Bucket, ClassifiedPattern, CompiledDomainSet, CompiledRuleSet, PatternForm};
