//! Locus - an areal-unit search service backed by Elasticsearch
//!
//! This library provides shared types and modules for the ingest and query binaries.

pub mod elasticsearch;
pub mod error;
pub mod geometry;
pub mod models;

pub use error::SearchError;
pub use geometry::{circle_to_polygon, GeoPoint};
pub use models::{Distance, GeoShape, PageWindow, Relation};
