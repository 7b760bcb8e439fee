//! Core domain types shared by the resolver, fetcher and renderer.

pub mod errors;
pub mod model;
