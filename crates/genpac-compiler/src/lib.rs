//! genpac Rule Compiler
//!
//! This crate compiles AdBlock-Plus style filter lists (gfwlist and user
//! rules) into the pattern lists or domain sets embedded in a PAC script.

pub mod classifier;
pub mod facade;
pub mod precise;
pub mod standard;
pub mod surmise;
pub mod wildcard;

pub use classifier::classify;
pub use facade::{compile_rules, CompileMode, CompiledRules};
pub use precise::{compile_precise, compile_precise_with_stats, PreciseStats};
pub use standard::{compile_standard, compile_standard_with_stats, StandardStats};
pub use surmise::{expand_alternation, surmise_domain};
pub use wildcard::wildcard_to_regex;
