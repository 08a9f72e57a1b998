use serde::{Deserialize, Serialize};

/// Hourly weather at the destination for the requested departure time.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailedWeather {
    pub temperature: f64,
    pub precipitation_chance: u8,
    pub condition_code: i32,
    pub description: String,
    pub wind_speed: f64,
    pub is_day: bool,
}

impl DetailedWeather {
    /// Builds a forecast whose description is derived from the WMO condition
    /// code, never from free text.
    pub fn from_code(
        temperature: f64,
        precipitation_chance: u8,
        condition_code: i32,
        wind_speed: f64,
        is_day: bool,
    ) -> Self {
        Self {
            temperature,
            precipitation_chance: precipitation_chance.min(100),
            condition_code,
            description: wmo_description(condition_code).to_string(),
            wind_speed,
            is_day,
        }
    }

    /// Recomputes `description` from `condition_code`, discarding whatever
    /// text the value was deserialized with.
    pub fn normalized(mut self) -> Self {
        self.description = wmo_description(self.condition_code).to_string();
        self.precipitation_chance = self.precipitation_chance.min(100);
        self
    }
}

/// WMO weather interpretation code lookup.
pub fn wmo_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Mainly clear, partly cloudy, and overcast",
        45 | 48 => "Fog and depositing rime fog",
        51..=55 => "Drizzle: Light, moderate, and dense intensity",
        61..=65 => "Rain: Slight, moderate and heavy intensity",
        71..=77 => "Snow fall: Slight, moderate, and heavy intensity",
        80..=82 => "Rain showers: Slight, moderate, and violent",
        c if c >= 95 => "Thunderstorm: Slight or moderate",
        _ => "Variable conditions",
    }
}
