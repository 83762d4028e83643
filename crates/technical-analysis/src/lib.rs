pub mod checklist;
pub mod engine;
pub mod indicators;
pub mod patterns;

#[cfg(test)]
mod indicators_tests;

pub use checklist::*;
pub use engine::*;
pub use indicators::*;
pub use patterns::*;
