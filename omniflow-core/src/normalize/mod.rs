//! Turns raw model output into a [`PredictionResult`].
//!
//! Malformed output never produces an error: the normalizer repairs what it
//! can, fills missing fields with defaults and, when no JSON object can be
//! recovered at all, returns the parse-failure result.

mod fields;
pub mod sanitize;

use rand::Rng;
use serde_json::{Map, Value};

use crate::chart::{synthesize_chart_with, CHART_POINTS};
use crate::{ChartPoint, CongestionLevel, DetailedWeather, PredictionResult, RouteStats};

pub use sanitize::{
    escape_stray_backslashes, extract_fenced_json, sanitize, strip_code_fences,
    strip_control_chars,
};

pub const DEFAULT_CONFIDENCE: u8 = 80;
pub const DEFAULT_SAFETY: u8 = 85;
pub const TRAVEL_TIME_PLACEHOLDER: &str = "Calculating...";
pub const TRAVEL_TIME_UNAVAILABLE: &str = "N/A";
const PREVIEW_CHARS: usize = 100;

/// Request-side facts the normalizer needs to fill defaults.
#[derive(Clone, Debug, Default)]
pub struct NormalizeContext {
    pub start_hour: u32,
    pub weather: Option<DetailedWeather>,
    pub route_stats: Option<RouteStats>,
}

impl NormalizeContext {
    pub fn new(start_hour: u32) -> Self {
        Self {
            start_hour,
            ..Self::default()
        }
    }

    pub fn with_weather(mut self, weather: Option<DetailedWeather>) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_route_stats(mut self, route_stats: Option<RouteStats>) -> Self {
        self.route_stats = route_stats;
        self
    }

    fn weather_impact(&self) -> String {
        self.weather
            .as_ref()
            .map(|weather| weather.description.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// First 100 characters of the raw output.
pub fn preview(raw: &str) -> String {
    raw.chars().take(PREVIEW_CHARS).collect()
}

fn parse_object(candidate: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(format!("expected a JSON object, found {}", kind(&other))),
        Err(err) => Err(err.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// `HH:00` for labels like `7:00` or `07:30`.
fn hour_label(time: &str) -> Option<String> {
    let hour: u32 = time.split(':').next()?.trim().parse().ok()?;
    (hour < 24).then(|| format!("{hour:02}:00"))
}

/// Places model points on the five hours starting at `start_hour`.
///
/// A point whose label names one of those hours fills that slot; the rest
/// fill the remaining slots in reply order. Slots left over keep synthesized
/// values.
fn lay_out_chart<R: Rng + ?Sized>(
    rng: &mut R,
    points: Vec<ChartPoint>,
    level: CongestionLevel,
    start_hour: u32,
) -> Vec<ChartPoint> {
    let mut chart = synthesize_chart_with(rng, level, start_hour);
    let mut filled = [false; CHART_POINTS];
    let mut unplaced = Vec::new();

    for point in points {
        let slot = hour_label(&point.time)
            .and_then(|label| chart.iter().position(|slot| slot.time == label))
            .filter(|&index| !filled[index]);
        match slot {
            Some(index) => {
                chart[index].congestion_level = point.congestion_level;
                filled[index] = true;
            }
            None => unplaced.push(point.congestion_level),
        }
    }

    let mut unplaced = unplaced.into_iter();
    for (slot, filled) in chart.iter_mut().zip(filled) {
        if filled {
            continue;
        }
        match unplaced.next() {
            Some(value) => slot.congestion_level = value,
            None => {
                tracing::debug!(level = %level, time = %slot.time, "synthesized chart point");
            }
        }
    }
    chart
}

/// Recovers the JSON object from model output: fenced-block extraction,
/// sanitization, a strict parse, then a parse of the outermost braces.
pub fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    let sanitized = sanitize(extract_fenced_json(raw));

    let first_error = match parse_object(&sanitized) {
        Ok(object) => return Some(object),
        Err(err) => err,
    };
    tracing::warn!(error = %first_error, "model output is not valid JSON, retrying on outer braces");

    let candidate = outer_braces(&sanitized)?;
    match parse_object(candidate) {
        Ok(object) => Some(object),
        Err(err) => {
            tracing::warn!(error = %err, "outer-brace repair failed");
            None
        }
    }
}

/// Degraded result used when no JSON object can be recovered.
pub fn parse_failure(raw: &str, context: &NormalizeContext) -> PredictionResult {
    tracing::warn!(raw_preview = %preview(raw), "returning parse-failure prediction");
    PredictionResult {
        summary: format!(
            "### ⚠️ Parsing Error\n\nThe AI generated a response, but it was not valid JSON. \
             Please try again.\n\nRaw Output:\n{}...",
            preview(raw)
        ),
        travel_time_estimate: TRAVEL_TIME_UNAVAILABLE.to_string(),
        congestion_level: Default::default(),
        confidence_score: None,
        safety_score: None,
        alternatives: Vec::new(),
        weather_impact: "Unknown".to_string(),
        event_impact: "Unknown".to_string(),
        chart_data: Vec::new(),
        traffic_breakdown: Vec::new(),
        factors: Vec::new(),
        route_links: Vec::new(),
        route_coordinates: None,
        route_stats: context.route_stats,
        route_segments: Vec::new(),
        detailed_weather: context.weather.clone(),
    }
}

pub fn normalize(raw: &str, context: &NormalizeContext) -> PredictionResult {
    normalize_with_rng(&mut rand::thread_rng(), raw, context)
}

/// Same as [`normalize`] with an explicit RNG for the synthesized chart.
pub fn normalize_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    raw: &str,
    context: &NormalizeContext,
) -> PredictionResult {
    let Some(object) = extract_object(raw) else {
        return parse_failure(raw, context);
    };

    let congestion_level = fields::congestion(&object, "congestionLevel").unwrap_or_default();
    let chart_data = lay_out_chart(
        rng,
        fields::chart_data(&object),
        congestion_level,
        context.start_hour,
    );

    PredictionResult {
        summary: fields::text(&object, "summary")
            .unwrap_or_else(|| format!("### Analysis Generated\n{}...", preview(raw))),
        travel_time_estimate: fields::text(&object, "travelTime")
            .unwrap_or_else(|| TRAVEL_TIME_PLACEHOLDER.to_string()),
        congestion_level,
        confidence_score: Some(
            fields::score(&object, "confidenceScore").unwrap_or(DEFAULT_CONFIDENCE),
        ),
        safety_score: Some(fields::score(&object, "safetyScore").unwrap_or(DEFAULT_SAFETY)),
        alternatives: fields::alternatives(&object),
        weather_impact: context.weather_impact(),
        event_impact: "Analyzed".to_string(),
        chart_data,
        traffic_breakdown: fields::traffic_breakdown(&object),
        factors: Vec::new(),
        route_links: Vec::new(),
        route_coordinates: None,
        route_stats: context.route_stats,
        route_segments: fields::route_segments(&object),
        detailed_weather: context.weather.clone(),
    }
}
