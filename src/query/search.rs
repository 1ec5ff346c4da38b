//! The query assembler: resolves a search region and runs one geo-shape
//! query against the area index.

use tracing::debug;
use uuid::Uuid;

use locus::elasticsearch::{self as es, EsClient};
use locus::error::SearchError;
use locus::geometry::circle_to_polygon;
use locus::models::{
    AreaDoc, BoundaryDoc, Distance, GeoShape, PageWindow, Relation, SearchResults,
};

/// Segments used when approximating a circle around a postcode pin.
const CIRCLE_SEGMENTS: usize = 30;

/// Handles searches across the area, postcode and boundary indices.
///
/// Constructed once at startup with its configuration; request handling
/// keeps no state beyond it.
pub struct SearchService {
    es: EsClient,
    areas_index: String,
    postcodes_index: String,
    boundaries_index: String,
    max_result_window: usize,
}

impl SearchService {
    pub fn new(
        es: EsClient,
        areas_index: &str,
        postcodes_index: &str,
        boundaries_index: &str,
        max_result_window: usize,
    ) -> Self {
        Self {
            es,
            areas_index: areas_index.to_string(),
            postcodes_index: postcodes_index.to_string(),
            boundaries_index: boundaries_index.to_string(),
            max_result_window,
        }
    }

    /// Area search around a postcode pin.
    ///
    /// Resolves the pin, approximates the requested radius as a polygon and
    /// matches areas with the requested relation (default `within`).
    pub async fn postcode_search(
        &self,
        postcode: &str,
        distance: &Distance,
        relation: Relation,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResults, SearchError> {
        let doc = es::find_postcode(&self.es, &self.postcodes_index, postcode)
            .await?
            .ok_or(SearchError::PostcodeNotFound)?;

        debug!(
            postcode,
            lat = doc.pin.location.lat,
            lon = doc.pin.location.lon,
            "resolved postcode pin"
        );

        let ring = circle_to_polygon(doc.pin.location, distance.as_metres(), CIRCLE_SEGMENTS)?;
        let shape = GeoShape::from_ring(ring);

        self.run(&shape, relation, limit, offset).await
    }

    /// Area search inside a stored boundary ("parent") document. The
    /// relation is fixed to `intersects`.
    pub async fn parent_search(
        &self,
        id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResults, SearchError> {
        let boundary = es::find_boundary(&self.es, &self.boundaries_index, id)
            .await?
            .ok_or(SearchError::BoundaryNotFound)?;

        self.run(&boundary.location, Relation::Intersects, limit, offset)
            .await
    }

    /// Store a validated boundary shape under a fresh id, returning the
    /// created document.
    pub async fn store_boundary(
        &self,
        name: Option<String>,
        shape: GeoShape,
    ) -> Result<BoundaryDoc, SearchError> {
        let doc = BoundaryDoc {
            id: Uuid::new_v4().to_string(),
            name,
            location: shape,
        };

        es::index_document(&self.es, &self.boundaries_index, &doc.id, &doc).await?;

        Ok(doc)
    }

    async fn run(
        &self,
        shape: &GeoShape,
        relation: Relation,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResults, SearchError> {
        let page = PageWindow::clamp(limit, offset, self.max_result_window)?;

        let (items, total) = es::search_by_shape(
            &self.es,
            &self.areas_index,
            shape,
            relation,
            page.limit,
            page.offset,
        )
        .await?;

        Ok(build_envelope(items, total, &page))
    }
}

/// Normalize a requested postcode for exact-term lookup: spaces stripped,
/// lower-cased.
pub fn normalize_postcode(raw: &str) -> String {
    raw.replace(' ', "").to_lowercase()
}

fn build_envelope(items: Vec<AreaDoc>, total: u64, page: &PageWindow) -> SearchResults {
    SearchResults {
        count: items.len(),
        items,
        limit: page.limit,
        offset: page.offset,
        total_count: total,
    }
}
