//! Read models for the query side of the allocation service.
//!
//! This crate provides:
//! - [`Projection`] trait for folding product events into read models
//! - [`AllocationsView`], which answers "where did this order's lines go?"

pub mod error;
pub mod projection;
pub mod views;

pub use error::{ProjectionError, Result};
pub use projection::Projection;
pub use views::{AllocationRow, AllocationsView};
