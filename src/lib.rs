//! # lkml
//!
//! A structural parser and symbol index for LookML model and view files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │             LookML text + path or URI                    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dsl: scope tracker + registry]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ParseResult                           │
//! │  (models, views + fields, explores + joins, properties)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [enhancer - optional, additive]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Enriched ParseResult                        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │     lsp (document symbols, go-to-definition), CLI        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The structural pass never fails. Enhancement runs an external tool and
//! can only add properties to what the structural pass found.

pub mod config;
pub mod dsl;
pub mod enhancer;
pub mod lsp;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::dsl::{
        parse, parse_with_options, Document, Explore, Field, FieldKind, Join, Model,
        ParseOptions, ParseResult, Property, View,
    };
    pub use crate::enhancer::{parse_and_enhance, SemanticEnhancer};
}

pub use dsl::{parse, Document, ParseResult};
