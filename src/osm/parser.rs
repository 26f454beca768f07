use crate::api::OverpassResponse;
use crate::api::overpass::Element;
use crate::domain::{Coordinates, PointRecord, UNNAMED};

/// Parse Overpass response into point records
///
/// # Algorithm
/// For each element, in response order:
/// - Name comes from the `name` tag, or `"N/A"` when missing
/// - Each of `lat`/`lon` comes from the element itself (nodes), falling
///   back to the same field of its `center` (ways and relations)
/// - Elements with no resolvable coordinates are dropped
pub fn parse_points(response: &OverpassResponse) -> Vec<PointRecord> {
    response
        .elements
        .iter()
        .filter_map(|element| {
            let position = resolve_coordinates(element)?;
            Some(PointRecord::new(
                element_name(element),
                position.lat,
                position.lon,
            ))
        })
        .collect()
}

fn element_name(element: &Element) -> &str {
    element
        .tags
        .as_ref()
        .and_then(|tags| tags.get("name"))
        .map(String::as_str)
        .unwrap_or(UNNAMED)
}

fn resolve_coordinates(element: &Element) -> Option<Coordinates> {
    let center = element.center;
    let lat = element.lat.or(center.and_then(|c| c.lat))?;
    let lon = element.lon.or(center.and_then(|c| c.lon))?;
    Some(Coordinates::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<PointRecord> {
        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        parse_points(&response)
    }

    #[test]
    fn test_parse_node() {
        let points = parse(
            r#"{"elements": [{"type": "node", "id": 1, "tags": {"name": "Cafe X"}, "lat": 47.4, "lon": 8.5}]}"#,
        );

        assert_eq!(points, vec![PointRecord::new("Cafe X", 47.4, 8.5)]);
        assert_eq!(points[0].elevation, None);
    }

    #[test]
    fn test_parse_way_and_relation_centers() {
        let points = parse(
            r#"{"elements": [
                {"type": "way", "id": 2, "tags": {"name": "Gasthaus"}, "center": {"lat": 47.21, "lon": 8.33}},
                {"type": "relation", "id": 3, "tags": {"name": "Zunfthaus"}, "center": {"lat": 47.37, "lon": 8.54}}
            ]}"#,
        );

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].coordinates(), Coordinates::new(47.21, 8.33));
        assert_eq!(points[1].coordinates(), Coordinates::new(47.37, 8.54));
    }

    #[test]
    fn test_direct_coordinates_win_over_center() {
        let points = parse(
            r#"{"elements": [{"type": "node", "id": 1, "lat": 47.0, "lon": 8.0, "center": {"lat": 46.0, "lon": 7.0}}]}"#,
        );

        assert_eq!(points[0].coordinates(), Coordinates::new(47.0, 8.0));
    }

    #[test]
    fn test_fallback_to_center_per_field() {
        let points = parse(
            r#"{"elements": [
                {"type": "way", "id": 1, "lat": 47.0, "center": {"lat": 46.0, "lon": 7.0}},
                {"type": "way", "id": 2, "lon": 8.5, "center": {"lat": 46.5}}
            ]}"#,
        );

        assert_eq!(points[0].coordinates(), Coordinates::new(47.0, 7.0));
        assert_eq!(points[1].coordinates(), Coordinates::new(46.5, 8.5));
    }

    #[test]
    fn test_missing_name_defaults() {
        let points = parse(
            r#"{"elements": [
                {"type": "node", "id": 1, "lat": 47.0, "lon": 8.0},
                {"type": "node", "id": 2, "lat": 47.1, "lon": 8.1, "tags": {"amenity": "restaurant"}}
            ]}"#,
        );

        assert_eq!(points[0].name, "N/A");
        assert_eq!(points[1].name, "N/A");
    }

    #[test]
    fn test_skip_elements_without_coordinates() {
        let points = parse(
            r#"{"elements": [
                {"type": "node", "id": 1, "tags": {"name": "A"}, "lat": 47.0, "lon": 8.0},
                {"type": "way", "id": 2, "tags": {"name": "B"}},
                {"type": "way", "id": 3, "tags": {"name": "C"}, "center": {"lat": 47.2}},
                {"type": "relation", "id": 4, "tags": {"name": "D"}, "center": {"lat": 47.3, "lon": 8.3}}
            ]}"#,
        );

        let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);
    }
}
