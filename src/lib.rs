//! Exploratory analysis of CORD-19 style paper metadata.
//!
//! Loads a metadata table, cleans it, derives word counts, aggregates it
//! and writes one SVG chart per aggregate. See [`pipeline::run`].

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod report;
