//! Elasticsearch client and operations.

mod bulk;
mod client;
mod query;
mod schema;

pub use bulk::BulkIndexer;
pub use client::EsClient;
pub use query::{find_boundary, find_postcode, index_document, search_by_shape};
pub use schema::{create_index, Mapping};
