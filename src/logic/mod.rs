//! Logic Module - Detection Engines
//!
//! - `patterns/` - detection rule tables (pure data) + compiled rule sets
//! - `behavioral/` - script/form/redirect behavior analysis
//! - `visual/` - page fingerprinting and brand similarity
//! - `fusion/` - cross-layer signal fusion
//! - `pipeline` - page event -> verdict composition

pub mod behavioral;
pub mod fusion;
pub mod patterns;
pub mod pipeline;
pub mod visual;
