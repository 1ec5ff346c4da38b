//! Error taxonomy shared across the query and ingest paths.

use thiserror::Error;

/// Every failure mode the search pipeline can report.
///
/// Errors are values: each stage returns one of these and the caller decides
/// how to surface it. `is_bad_request`/`is_not_found` give the HTTP layer its
/// classification; everything unclassified is a server-side failure.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("empty query term: distance")]
    EmptyDistance,

    #[error("invalid distance value: {0}. Should contain a number and unit of distance separated by a comma e.g. 40,km")]
    InvalidDistance(String),

    #[error("too many segments, a maximum of 180 segments can describe a circle")]
    TooManySegments,

    #[error("latitude has to be between -90 and 90")]
    InvalidLatitude,

    #[error("longitude has to be between -180 and 180")]
    InvalidLongitude,

    #[error("missing type value in request")]
    MissingType,

    #[error("invalid type value: {0}. Should be one of the following: polygon, multipolygon")]
    InvalidType(String),

    #[error("missing shape value in request")]
    MissingShape,

    #[error("empty shape")]
    EmptyShape,

    #[error("invalid number of coordinates, need a minimum of 4 values")]
    TooFewCoordinates,

    #[error("missing coordinates in array")]
    EmptyCoordinates,

    #[error("should contain two coordinates, representing [longitude, latitude]")]
    InvalidCoordinates,

    #[error("invalid list of coordinates, the first and last coordinates should be the same to complete boundary line")]
    UnclosedRing,

    #[error("invalid multipolygon, should contain a minimum of 2 polygons")]
    TooFewPolygons,

    #[error("the maximum offset has been reached, the offset cannot be more than {0}")]
    OffsetExceedsMaximum(usize),

    #[error("failed to parse query parameters, values must be an integer")]
    ParameterParse,

    #[error(r#"incorrect relation value: {0}. It should be either "within" or "intersects""#)]
    InvalidRelation(String),

    #[error("postcode not found")]
    PostcodeNotFound,

    #[error("invalid id, boundary document does not exist")]
    BoundaryNotFound,

    #[error("failed to parse json body")]
    UnparsableBody,

    #[error("unexpected status code from elasticsearch: {0}")]
    UnexpectedStatusCode(u16),

    #[error("elasticsearch request failed: {0}")]
    Upstream(#[from] elasticsearch::Error),

    #[error("failed to parse elasticsearch response")]
    MalformedResponse,
}

impl SearchError {
    /// True for the terminal not-found conditions.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SearchError::PostcodeNotFound | SearchError::BoundaryNotFound
        )
    }

    /// True for malformed input and structural violations in uploaded shapes.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            SearchError::EmptyDistance
                | SearchError::InvalidDistance(_)
                | SearchError::MissingType
                | SearchError::InvalidType(_)
                | SearchError::MissingShape
                | SearchError::EmptyShape
                | SearchError::TooFewCoordinates
                | SearchError::EmptyCoordinates
                | SearchError::InvalidCoordinates
                | SearchError::UnclosedRing
                | SearchError::TooFewPolygons
                | SearchError::OffsetExceedsMaximum(_)
                | SearchError::ParameterParse
                | SearchError::InvalidRelation(_)
                | SearchError::UnparsableBody
        )
    }
}
