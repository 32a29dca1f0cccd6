//! Document analysis - per-document snapshots and cursor lookup

pub mod document;
