//! Application layer: resolution, fetching, fusion and rendering.

pub mod fetch;
pub mod fusion;
pub mod preview;
pub mod render;
pub mod resolve;
