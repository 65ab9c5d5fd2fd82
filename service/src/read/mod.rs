//! Read entities definitions.

pub mod media;
pub mod property;
