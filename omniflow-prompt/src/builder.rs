use std::collections::HashMap;

use omniflow_core::{DetailedWeather, OmniflowError, RouteComposition, RouteStats};
use serde_json::Value;

use crate::context::{route_context, weather_context};
use crate::{PromptTemplate, TimeContext};

const TRAFFIC_PROMPT: &str = r####"ACT AS A SENIOR TRAFFIC ENGINEER AND DATA SCIENTIST.
Perform a rigorous calculated analysis for a trip from "{{origin}}" to "{{destination}}".

--- INPUT DATA ---
1. TIMING: {{time_context}}
2. ROUTE PHYSICS: {{route_context}}
3. HOURLY WEATHER: {{weather_context}}

--- CALCULATION LOGIC (MENTAL SANDBOX) ---
Apply the following multipliers to the "Free-Flow Duration":
1. **Base Rush Hour**: +40-80% for Commute times on Weekdays (Urban), +10-20% (Highway).
2. **Weather Penalty**:
   - Rain: +15% (Urban), +25% (Highway - spray/visibility).
   - Snow/Ice: +60% (Urban), +40% (Highway - plowing usually better on highways).
   - Sun Glare (Morning/Evening): +5-10%.
3. **Holiday/Event**: Check specific date "{{readable_date}}". If Major Holiday, reverse rush hour logic.
4. **Road Type**: High % Urban = more susceptible to gridlock variables. High % Highway = susceptible to single accident delays.

--- REQUIRED OUTPUT (JSON) ---
You must output ONLY valid JSON inside a code block. Do NOT include trailing commas.

Structure:
{
  "travelTime": "Calculated string (e.g. 1 hr 24 min)",
  "congestionLevel": "Low" | "Moderate" | "High" | "Severe",
  "confidenceScore": number (0-100, based on data quality),
  "safetyScore": number (0-100, deduct for rain/night/wind),
  "summary": "### Engineer's Verdict\n\n[Markdown analysis including the calculated delay factors...]",
  "routeSegments": [
    { "segmentId": 1, "startPercentage": 0, "endPercentage": 30, "congestionLevel": "High" },
    { "segmentId": 2, "startPercentage": 30, "endPercentage": 100, "congestionLevel": "Low" }
  ],
  "chartData": [ { "time": "HH:MM", "congestionLevel": 0-100 } for times: {{forecast_hours}} ],
  "trafficBreakdown": [
     {"name": "Base Distance", "value": 50, "fill": "#6366f1"},
     {"name": "Rush Hour", "value": 20, "fill": "#f59e0b"},
     {"name": "Weather Delay", "value": 10, "fill": "#0ea5e9"}
  ],
  "alternatives": [
     { "name": "Alternative A", "time": "...", "description": "..." },
     { "name": "Alternative B", "time": "...", "description": "..." }
  ]
}
"####;

/// Everything known about a trip before the model is consulted.
#[derive(Clone, Copy, Debug)]
pub struct TripContext<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub time: &'a TimeContext,
    pub weather: Option<&'a DetailedWeather>,
    pub route_stats: Option<&'a RouteStats>,
    pub route_composition: Option<&'a RouteComposition>,
}

/// Renders the traffic-engineer instruction prompt.
///
/// The prompt text is fixed; only the trip values change between calls.
#[derive(Debug, Clone)]
pub struct TrafficPromptBuilder {
    template: PromptTemplate,
}

impl Default for TrafficPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrafficPromptBuilder {
    pub fn new() -> Self {
        Self {
            template: PromptTemplate::new(TRAFFIC_PROMPT),
        }
    }

    pub fn build(&self, trip: &TripContext<'_>) -> Result<String, OmniflowError> {
        let mut vars: HashMap<String, Value> = HashMap::new();
        vars.insert("origin".to_string(), Value::from(trip.origin));
        vars.insert("destination".to_string(), Value::from(trip.destination));
        vars.insert("time_context".to_string(), Value::from(trip.time.describe()));
        vars.insert(
            "route_context".to_string(),
            Value::from(route_context(trip.route_stats, trip.route_composition)),
        );
        vars.insert(
            "weather_context".to_string(),
            Value::from(weather_context(trip.weather)),
        );
        vars.insert(
            "readable_date".to_string(),
            Value::from(trip.time.readable_date.as_str()),
        );
        vars.insert(
            "forecast_hours".to_string(),
            Value::from(trip.time.forecast_hours().join(", ")),
        );
        self.template.render(&vars)
    }
}
