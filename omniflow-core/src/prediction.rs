use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DetailedWeather, OmniflowError, RouteStats};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CongestionLevel {
    Low,
    #[default]
    Moderate,
    High,
    Severe,
}

impl CongestionLevel {
    pub const ALL: [CongestionLevel; 4] = [
        CongestionLevel::Low,
        CongestionLevel::Moderate,
        CongestionLevel::High,
        CongestionLevel::Severe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low",
            CongestionLevel::Moderate => "Moderate",
            CongestionLevel::High => "High",
            CongestionLevel::Severe => "Severe",
        }
    }

    /// Typical congestion percentage for this level, used by chart synthesis.
    pub fn base_value(&self) -> u8 {
        match self {
            CongestionLevel::Low => 20,
            CongestionLevel::Moderate => 50,
            CongestionLevel::High => 75,
            CongestionLevel::Severe => 90,
        }
    }

    /// Case-insensitive match against the four level names, ignoring
    /// surrounding whitespace.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CongestionLevel {
    type Err = OmniflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| {
            OmniflowError::InvalidInput(format!("unknown congestion level '{s}'"))
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time: String,
    pub congestion_level: u8,
}

impl ChartPoint {
    pub fn at_hour(hour: u32, congestion_level: u8) -> Self {
        Self {
            time: format!("{:02}:00", hour % 24),
            congestion_level,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TrafficBreakdown {
    pub name: String,
    pub value: u8,
    pub fill: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub segment_id: u32,
    pub start_percentage: f64,
    pub end_percentage: f64,
    pub congestion_level: CongestionLevel,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteAlternative {
    pub name: String,
    pub time: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteLink {
    pub title: String,
    pub url: String,
}

/// Canonical output of a traffic prediction.
///
/// Built once per request by the response normalizer. The only field filled
/// in afterwards is `route_coordinates`, through [`PredictionResult::with_route_coordinates`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub summary: String,
    pub travel_time_estimate: String,
    pub congestion_level: CongestionLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<u8>,
    #[serde(default)]
    pub alternatives: Vec<RouteAlternative>,
    pub weather_impact: String,
    pub event_impact: String,
    #[serde(default)]
    pub chart_data: Vec<ChartPoint>,
    #[serde(default)]
    pub traffic_breakdown: Vec<TrafficBreakdown>,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub route_links: Vec<RouteLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_coordinates: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_stats: Option<RouteStats>,
    #[serde(default)]
    pub route_segments: Vec<RouteSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_weather: Option<DetailedWeather>,
}

impl PredictionResult {
    pub fn with_route_coordinates(mut self, coordinates: Vec<[f64; 2]>) -> Self {
        self.route_coordinates = Some(coordinates);
        self
    }
}
