//! Static reference data consumed by forms and filters.

pub mod amenities;
pub mod cebu;
pub mod property_types;
pub mod statuses;
