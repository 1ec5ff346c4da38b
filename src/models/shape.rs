//! Geo-shape payloads: the polygon/multipolygon union, structural validation
//! of externally supplied shapes, and the spatial relation selector.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SearchError;

/// A closed ring of `[longitude, latitude]` pairs.
pub type Ring = Vec<[f64; 2]>;

/// A validated geo-shape payload.
///
/// Serializes to the `{"type": ..., "coordinates": ...}` form used both in
/// geo-shape queries and in stored boundary documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "lowercase")]
pub enum GeoShape {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl GeoShape {
    /// Wrap a single generated ring as a polygon.
    pub fn from_ring(ring: Ring) -> Self {
        GeoShape::Polygon(vec![ring])
    }

    pub fn shape_type(&self) -> &'static str {
        match self {
            GeoShape::Polygon(_) => "polygon",
            GeoShape::MultiPolygon(_) => "multipolygon",
        }
    }

    /// Validate an untyped `{type, coordinates}` payload and build the typed
    /// shape.
    ///
    /// Checks run outer-to-inner and stop at the first violation: the tag,
    /// the presence of coordinates, then per ring its presence, point count,
    /// point arity, and closure.
    pub fn from_parts(
        shape_type: Option<&str>,
        coordinates: Option<&Value>,
    ) -> Result<Self, SearchError> {
        let shape_type = match shape_type {
            None | Some("") => return Err(SearchError::MissingType),
            Some(t) => t,
        };

        if shape_type != "polygon" && shape_type != "multipolygon" {
            return Err(SearchError::InvalidType(shape_type.to_string()));
        }

        let coordinates = match coordinates {
            None | Some(Value::Null) => return Err(SearchError::MissingShape),
            Some(c) => c,
        };

        if shape_type == "polygon" {
            return Ok(GeoShape::Polygon(parse_rings(coordinates)?));
        }

        let polygons = coordinates.as_array().ok_or(SearchError::EmptyShape)?;
        if polygons.len() < 2 {
            return Err(SearchError::TooFewPolygons);
        }

        let mut parsed = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            parsed.push(parse_rings(polygon)?);
        }

        Ok(GeoShape::MultiPolygon(parsed))
    }
}

fn parse_rings(value: &Value) -> Result<Vec<Ring>, SearchError> {
    let rings = value.as_array().ok_or(SearchError::EmptyShape)?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(value: &Value) -> Result<Ring, SearchError> {
    let points = match value.as_array() {
        Some(points) if !points.is_empty() => points,
        _ => return Err(SearchError::EmptyShape),
    };

    if points.len() < 4 {
        return Err(SearchError::TooFewCoordinates);
    }

    let mut ring = Vec::with_capacity(points.len());
    for point in points {
        ring.push(parse_point(point)?);
    }

    let first = ring[0];
    let last = ring[ring.len() - 1];
    if first[0] != last[0] || first[1] != last[1] {
        return Err(SearchError::UnclosedRing);
    }

    Ok(ring)
}

fn parse_point(value: &Value) -> Result<[f64; 2], SearchError> {
    if value.is_null() {
        return Err(SearchError::EmptyCoordinates);
    }

    let pair = value.as_array().ok_or(SearchError::InvalidCoordinates)?;
    if pair.len() != 2 {
        return Err(SearchError::InvalidCoordinates);
    }

    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(lon), Some(lat)) => Ok([lon, lat]),
        _ => Err(SearchError::InvalidCoordinates),
    }
}

/// How a stored geometry must relate to the query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Intersects,
    Within,
}

impl Relation {
    /// Parse a requested relation value, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        match raw.to_lowercase().as_str() {
            "intersects" => Ok(Relation::Intersects),
            "within" => Ok(Relation::Within),
            _ => Err(SearchError::InvalidRelation(raw.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Intersects => "intersects",
            Relation::Within => "within",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn closed_ring() -> Value {
        json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]])
    }

    fn open_ring() -> Value {
        json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
    }

    #[test]
    fn test_valid_polygon() {
        let coords = json!([closed_ring()]);
        let shape = GeoShape::from_parts(Some("polygon"), Some(&coords)).unwrap();
        assert_eq!(shape.shape_type(), "polygon");
        assert_eq!(
            shape,
            GeoShape::Polygon(vec![vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 0.0]
            ]])
        );
    }

    #[test]
    fn test_missing_type() {
        let coords = json!([closed_ring()]);
        for shape_type in [None, Some("")] {
            let err = GeoShape::from_parts(shape_type, Some(&coords)).unwrap_err();
            assert!(matches!(err, SearchError::MissingType));
        }
    }

    #[test]
    fn test_invalid_type() {
        let coords = json!([closed_ring()]);
        let err = GeoShape::from_parts(Some("circle"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidType(_)));
    }

    #[test]
    fn test_missing_coordinates() {
        let err = GeoShape::from_parts(Some("polygon"), None).unwrap_err();
        assert!(matches!(err, SearchError::MissingShape));

        let null = Value::Null;
        let err = GeoShape::from_parts(Some("polygon"), Some(&null)).unwrap_err();
        assert!(matches!(err, SearchError::MissingShape));
    }

    #[test]
    fn test_empty_ring() {
        let coords = json!([[]]);
        let err = GeoShape::from_parts(Some("polygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::EmptyShape));
    }

    #[test]
    fn test_ring_with_three_points() {
        let coords = json!([[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]);
        let err = GeoShape::from_parts(Some("polygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::TooFewCoordinates));
    }

    #[test]
    fn test_null_point() {
        let coords = json!([[[0.0, 0.0], null, [1.0, 1.0], [0.0, 0.0]]]);
        let err = GeoShape::from_parts(Some("polygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::EmptyCoordinates));
    }

    #[test]
    fn test_point_with_wrong_arity() {
        let coords = json!([[[0.0, 0.0], [1.0, 0.0, 3.0], [1.0, 1.0], [0.0, 0.0]]]);
        let err = GeoShape::from_parts(Some("polygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidCoordinates));
    }

    #[test]
    fn test_non_numeric_point() {
        let coords = json!([[[0.0, 0.0], ["a", "b"], [1.0, 1.0], [0.0, 0.0]]]);
        let err = GeoShape::from_parts(Some("polygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidCoordinates));
    }

    #[test]
    fn test_unclosed_ring() {
        let coords = json!([open_ring()]);
        let err = GeoShape::from_parts(Some("polygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::UnclosedRing));
    }

    #[test]
    fn test_multipolygon_needs_two_polygons() {
        let coords = json!([[closed_ring()]]);
        let err = GeoShape::from_parts(Some("multipolygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::TooFewPolygons));
    }

    #[test]
    fn test_valid_multipolygon() {
        let coords = json!([[closed_ring()], [closed_ring()]]);
        let shape = GeoShape::from_parts(Some("multipolygon"), Some(&coords)).unwrap();
        assert_eq!(shape.shape_type(), "multipolygon");
    }

    #[test]
    fn test_multipolygon_inner_ring_violations_propagate() {
        let coords = json!([[closed_ring()], [open_ring()]]);
        let err = GeoShape::from_parts(Some("multipolygon"), Some(&coords)).unwrap_err();
        assert!(matches!(err, SearchError::UnclosedRing));
    }

    #[test]
    fn test_shape_serializes_with_tag_and_coordinates() {
        let shape = GeoShape::from_ring(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            })
        );
    }

    #[test]
    fn test_shape_round_trips_through_serde() {
        let shape = GeoShape::from_ring(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        let value = serde_json::to_value(&shape).unwrap();
        let back: GeoShape = serde_json::from_value(value).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn test_relation_parse() {
        assert_eq!(Relation::parse("within").unwrap(), Relation::Within);
        assert_eq!(Relation::parse("INTERSECTS").unwrap(), Relation::Intersects);
        assert!(matches!(
            Relation::parse("near").unwrap_err(),
            SearchError::InvalidRelation(_)
        ));
    }
}
