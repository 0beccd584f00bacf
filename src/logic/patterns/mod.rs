//! Pattern Library - Detection Rules as Data
//!
//! Rule tables (regex families, selector keywords, TLD denylists) are plain
//! serde values with shipped defaults, so deployments can swap in updated
//! tables without recompiling. `CompiledLibrary` is the runtime form.

pub mod library;
pub mod types;
pub mod urls;

pub use library::{builtin_library, CompiledLibrary, CompiledObfuscationRule, CompiledRule};
pub use types::{ObfuscationRule, PatternError, PatternLibrary, PatternRule};
