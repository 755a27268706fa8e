//! Exchange rate sources

pub mod sources;
