//! Document model for papertrail.
//!
//! A parsed paper is a [`Document`]: free-form metadata fields plus an ordered
//! list of titled [`Section`]s. Documents are produced by an external parsing
//! service and handed to the diff engine read-only.
//!
//! # Key Types
//!
//! - [`Document`] / [`Section`] -- The parsed paper
//! - [`Metadata`] -- Non-section fields, keyed by name
//! - [`InputFormat`] -- Which JSON shape a document arrives in

pub mod document;
pub mod error;
pub mod format;

pub use document::{Document, Metadata, Section};
pub use error::{TypeError, TypeResult};
pub use format::InputFormat;
