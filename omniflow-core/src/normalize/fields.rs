//! Lenient mapping from a parsed JSON object onto prediction fields.
//!
//! Every reader returns `None` (or an empty list) instead of failing, so one
//! malformed field never affects another.

use serde_json::{Map, Value};

use crate::{ChartPoint, CongestionLevel, RouteAlternative, RouteSegment, TrafficBreakdown};

const BREAKDOWN_PALETTE: [&str; 5] = ["#6366f1", "#f59e0b", "#0ea5e9", "#10b981", "#ef4444"];

pub(crate) type Object = Map<String, Value>;

pub(crate) fn text(object: &Object, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn percent(value: &Value) -> Option<u8> {
    number(value).map(|n| n.round().clamp(0.0, 100.0) as u8)
}

pub(crate) fn score(object: &Object, key: &str) -> Option<u8> {
    object.get(key).and_then(percent)
}

pub(crate) fn congestion(object: &Object, key: &str) -> Option<CongestionLevel> {
    object
        .get(key)
        .and_then(Value::as_str)
        .and_then(CongestionLevel::parse_lenient)
}

fn objects<'a>(object: &'a Object, key: &str) -> impl Iterator<Item = &'a Object> {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn string_or_empty(object: &Object, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Chart points with a time label and a numeric level, in reply order.
pub(crate) fn chart_data(object: &Object) -> Vec<ChartPoint> {
    objects(object, "chartData")
        .filter_map(|point| {
            let time = text(point, "time")?;
            let congestion_level = point.get("congestionLevel").and_then(percent)?;
            Some(ChartPoint {
                time: time.trim().to_string(),
                congestion_level,
            })
        })
        .collect()
}

pub(crate) fn traffic_breakdown(object: &Object) -> Vec<TrafficBreakdown> {
    objects(object, "trafficBreakdown")
        .enumerate()
        .filter_map(|(index, entry)| {
            let name = text(entry, "name")?;
            let value = entry.get("value").and_then(percent)?;
            let fill = text(entry, "fill")
                .unwrap_or_else(|| BREAKDOWN_PALETTE[index % BREAKDOWN_PALETTE.len()].to_string());
            Some(TrafficBreakdown { name, value, fill })
        })
        .collect()
}

/// Route segments with both bounds present and `end > start` after clamping.
pub(crate) fn route_segments(object: &Object) -> Vec<RouteSegment> {
    objects(object, "routeSegments")
        .enumerate()
        .filter_map(|(index, entry)| {
            let start = entry.get("startPercentage").and_then(number)?.clamp(0.0, 100.0);
            let end = entry.get("endPercentage").and_then(number)?.clamp(0.0, 100.0);
            if end <= start {
                return None;
            }
            let segment_id = entry
                .get("segmentId")
                .and_then(number)
                .filter(|id| *id >= 0.0)
                .map(|id| id as u32)
                .unwrap_or(index as u32 + 1);
            Some(RouteSegment {
                segment_id,
                start_percentage: start,
                end_percentage: end,
                congestion_level: congestion(entry, "congestionLevel").unwrap_or_default(),
            })
        })
        .collect()
}

pub(crate) fn alternatives(object: &Object) -> Vec<RouteAlternative> {
    objects(object, "alternatives")
        .map(|entry| RouteAlternative {
            name: string_or_empty(entry, "name"),
            time: string_or_empty(entry, "time"),
            description: string_or_empty(entry, "description"),
        })
        .collect()
}
