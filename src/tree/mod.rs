//! Tree Module
//!
//! JSON-like trees with deep clone and deep merge. Both operations are
//! pure: they never modify their inputs and never fail.

mod clone;
mod merge;
mod object;
mod value;

#[cfg(test)]
mod property_tests;

pub use clone::{deep_clone, deep_clone_map};
pub use merge::deep_merge;
pub use object::Object;
pub use value::{Map, OpaqueValue, Value};
