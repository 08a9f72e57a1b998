//! Natural-language fragments describing the trip inputs.
//!
//! Missing data is always spelled out so the prompt keeps the same shape.

use omniflow_core::{DetailedWeather, RouteComposition, RouteStats};

pub const WEATHER_UNAVAILABLE: &str = "Data Unavailable. Assume Standard Conditions.";
pub const ROUTE_UNAVAILABLE: &str = "Route geometry unavailable.";

pub fn weather_context(weather: Option<&DetailedWeather>) -> String {
    let Some(weather) = weather else {
        return WEATHER_UNAVAILABLE.to_string();
    };
    format!(
        "Condition: {} (Code: {}). Temp: {}°C. Precipitation Chance: {}%. Wind: {} km/h. Daylight: {}.",
        weather.description,
        weather.condition_code,
        weather.temperature,
        weather.precipitation_chance,
        weather.wind_speed,
        if weather.is_day { "Yes" } else { "No" }
    )
}

pub fn route_context(
    stats: Option<&RouteStats>,
    composition: Option<&RouteComposition>,
) -> String {
    match (stats, composition) {
        (None, None) => ROUTE_UNAVAILABLE.to_string(),
        (Some(stats), Some(composition)) => {
            format!("{} {}", distance_fragment(stats), composition_fragment(composition))
        }
        (Some(stats), None) => format!(
            "{} Composition: unavailable, assume a mix of highway and urban roads.",
            distance_fragment(stats)
        ),
        (None, Some(composition)) => format!(
            "Distance and Free-Flow Duration: unavailable. {}",
            composition_fragment(composition)
        ),
    }
}

fn distance_fragment(stats: &RouteStats) -> String {
    format!(
        "Distance: {:.1} km. Free-Flow Duration: {} min.",
        stats.distance_km(),
        stats.free_flow_minutes()
    )
}

fn composition_fragment(composition: &RouteComposition) -> String {
    let roads = if composition.major_road_names.is_empty() {
        "Unknown".to_string()
    } else {
        composition.major_road_names.join(", ")
    };
    format!(
        "Composition: {}% Highway / {}% Urban. Major Roads: {}.",
        composition.percent_highway, composition.percent_urban, roads
    )
}
