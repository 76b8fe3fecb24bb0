//! Core of the Kapusta loan-request report viewer.
//!
//! Data flow:
//!   pager → fetch → normalize → (cached items) → store → query → front end
//!
//! The yield calculator is independent of the pipeline.

pub mod aliases;
pub mod calculator;
pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pager;
pub mod query;
pub mod session;
pub mod store;
pub mod types;
