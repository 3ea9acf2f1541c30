//! Chart analyzers.

pub mod extlint;
