//! LSP capability handlers

pub mod definition;
pub mod symbols;
