//! Relationship graph assembly
//!
//! Structure:
//! - `assembler.rs` - Canonical orientation and deduplication of candidates

mod assembler;

pub use assembler::{RelationshipAssembler, assemble};
