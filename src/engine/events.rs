use crate::routes::Point;
use serde_json::Value;

/// One normalized position report off the live stream.
#[derive(Debug, Clone)]
pub struct LocationEvent {
    pub vehicle_id: String,
    pub point: Point,
    pub speed_kmh: Option<f64>,
    /// Unix seconds, when the upstream payload carried a usable timestamp.
    pub recorded_at: Option<u64>,
}

/// Normalize a raw tracker payload into location events.
///
/// The fleet backend has gone through several schema generations, so this
/// accepts a single object or an array, with coordinates as flat
/// `latitude`/`longitude` fields, `lat`/`lng`(`lon`) shorthand, a GeoJSON
/// `location.coordinates` pair (lon-first), or a PostGIS `location.x`/`y`
/// object. Entries missing an id or a resolvable coordinate are dropped;
/// one bad entry never affects the others.
pub fn parse_events(payload: &Value) -> Vec<LocationEvent> {
    let items: Vec<&Value> = match payload {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    items
        .into_iter()
        .filter_map(|item| {
            let event = parse_single(item);
            if event.is_none() {
                tracing::debug!(entry = %item, "dropping malformed location entry");
            }
            event
        })
        .collect()
}

fn parse_single(item: &Value) -> Option<LocationEvent> {
    let vehicle_id = field_string(item, &["vehicle_id", "vehicleId", "id"])?;
    let point = extract_point(item)?;

    if !point.lat.is_finite() || !point.lon.is_finite() {
        return None;
    }

    let speed_kmh = field_f64(item, &["speed", "velocity"]);
    let recorded_at = field_string(item, &["recorded_at", "recordedAt"])
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.timestamp().max(0) as u64);

    Some(LocationEvent {
        vehicle_id,
        point,
        speed_kmh,
        recorded_at,
    })
}

fn extract_point(item: &Value) -> Option<Point> {
    // GeoJSON point: coordinates are [lon, lat].
    if let Some(coords) = item.pointer("/location/coordinates").and_then(Value::as_array) {
        let lon = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        return Some(Point::new(lat, lon));
    }

    // PostGIS x/y object: x is longitude.
    if let (Some(x), Some(y)) = (
        item.pointer("/location/x").and_then(Value::as_f64),
        item.pointer("/location/y").and_then(Value::as_f64),
    ) {
        return Some(Point::new(y, x));
    }

    // Flat fields, long or short names.
    let lat = field_f64(item, &["latitude", "lat"])?;
    let lon = field_f64(item, &["longitude", "lng", "lon"])?;
    Some(Point::new(lat, lon))
}

fn field_f64(item: &Value, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| {
        let v = item.get(name)?;
        // Some feeds quote their numbers.
        v.as_f64().or_else(|| v.as_str()?.parse().ok())
    })
}

fn field_string(item: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match item.get(name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_flat_fields() {
        let events = parse_events(&json!([
            {"vehicle_id": "SH-01", "latitude": 13.96, "longitude": 100.58, "speed": 18.5}
        ]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].vehicle_id, "SH-01");
        assert_eq!(events[0].point.lat, 13.96);
        assert_eq!(events[0].speed_kmh, Some(18.5));
    }

    #[test]
    fn parses_shorthand_and_velocity() {
        let events = parse_events(&json!(
            {"vehicleId": "SH-02", "lat": "13.9", "lng": "100.5", "velocity": 12}
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].point.lon, 100.5);
        assert_eq!(events[0].speed_kmh, Some(12.0));
    }

    #[test]
    fn parses_geojson_location_lon_first() {
        let events = parse_events(&json!([
            {"id": 7, "location": {"type": "Point", "coordinates": [100.58, 13.96]}}
        ]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].vehicle_id, "7");
        assert_eq!(events[0].point.lat, 13.96);
        assert_eq!(events[0].point.lon, 100.58);
        assert_eq!(events[0].speed_kmh, None);
    }

    #[test]
    fn parses_postgis_xy() {
        let events = parse_events(&json!(
            {"vehicle_id": "SH-03", "location": {"x": 100.58, "y": 13.96}}
        ));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].point.lat, 13.96);
    }

    #[test]
    fn drops_malformed_entries_without_affecting_others() {
        let events = parse_events(&json!([
            {"vehicle_id": "SH-01", "lat": 13.9, "lng": 100.5},
            {"vehicle_id": "SH-02"},
            {"lat": 13.9, "lng": 100.5},
            {"vehicle_id": "SH-04", "lat": "not-a-number", "lng": 100.5},
            {"vehicle_id": "SH-05", "lat": 14.0, "lon": 100.6}
        ]));
        let ids: Vec<&str> = events.iter().map(|e| e.vehicle_id.as_str()).collect();
        assert_eq!(ids, vec!["SH-01", "SH-05"]);
    }

    #[test]
    fn reads_rfc3339_recorded_at() {
        let events = parse_events(&json!(
            {"vehicle_id": "SH-01", "lat": 13.9, "lng": 100.5,
             "recorded_at": "2024-05-01T08:30:00+07:00"}
        ));
        assert_eq!(events[0].recorded_at, Some(1714527000));
    }
}
