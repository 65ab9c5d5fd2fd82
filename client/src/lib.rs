//! Typed client of the property listing REST API.
//!
//! Maps loosely-typed form state into wire requests, validates it before
//! submission, and normalizes responses and failures.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod agents;
pub mod error;
pub mod file;
pub mod filter;
pub mod frontend;
pub mod geocode;
pub mod mapper;
pub mod reference;
pub mod service;
pub mod transport;
pub mod validator;

pub use self::{
    error::{Details, Error, ErrorKind},
    file::File,
    filter::Filter,
    frontend::{Agent, Property},
    mapper::{CoercionPolicy, Mapper, MappingError},
    service::PropertyService,
    transport::{Http, Transport},
    validator::FileRules,
};
