use serde::{Deserialize, Serialize};

const MAX_MAJOR_ROADS: usize = 5;
const HIGHWAY_KEYWORDS: [&str; 6] = [
    "Highway",
    "Fwy",
    "Motorway",
    "Autobahn",
    "Expressway",
    "Toll",
];

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LocationData {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Free-flow metrics for the driving route.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteStats {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn free_flow_minutes(&self) -> i64 {
        (self.duration_seconds / 60.0).round() as i64
    }
}

/// One maneuver of a routed path, as reported by the routing engine.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RouteStep {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "ref")]
    pub road_ref: String,
    #[serde(default)]
    pub distance: f64,
}

impl RouteStep {
    fn is_highway(&self) -> bool {
        !self.road_ref.is_empty()
            || HIGHWAY_KEYWORDS
                .iter()
                .any(|keyword| self.name.contains(keyword))
    }

    fn label(&self) -> Option<&str> {
        if !self.road_ref.is_empty() {
            Some(&self.road_ref)
        } else if !self.name.is_empty() {
            Some(&self.name)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteComposition {
    pub percent_highway: u8,
    pub percent_urban: u8,
    pub major_road_names: Vec<String>,
}

impl RouteComposition {
    pub fn new(percent_highway: u8, major_road_names: Vec<String>) -> Self {
        let percent_highway = percent_highway.min(100);
        let mut names: Vec<String> = Vec::with_capacity(MAX_MAJOR_ROADS);
        for name in major_road_names {
            if names.len() == MAX_MAJOR_ROADS {
                break;
            }
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Self {
            percent_highway,
            percent_urban: 100 - percent_highway,
            major_road_names: names,
        }
    }

    /// Classifies each step as highway or urban by its reference number and
    /// name, weighting by distance.
    pub fn from_steps(steps: &[RouteStep]) -> Self {
        let mut highway = 0.0;
        let mut urban = 0.0;
        for step in steps {
            let distance = step.distance.max(0.0);
            if step.is_highway() {
                highway += distance;
            } else {
                urban += distance;
            }
        }

        let total = highway + urban;
        let percent_highway = if total > 0.0 {
            (highway / total * 100.0).round() as u8
        } else {
            0
        };

        let names = steps
            .iter()
            .filter_map(RouteStep::label)
            .map(str::to_string)
            .collect();
        Self::new(percent_highway, names)
    }
}

/// Routed path between two locations.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RouteResult {
    pub polyline: Vec<[f64; 2]>,
    pub stats: RouteStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<RouteComposition>,
}
