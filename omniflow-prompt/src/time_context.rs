use std::fmt;

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Weekday};
use omniflow_core::chart::chart_hours;
use omniflow_core::OmniflowError;
use serde::Serialize;

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TimeOfDay {
    MorningCommute,
    EveningCommute,
    MidDay,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=9 => TimeOfDay::MorningCommute,
            16..=19 => TimeOfDay::EveningCommute,
            h if h > 19 || h < 5 => TimeOfDay::Night,
            _ => TimeOfDay::MidDay,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::MorningCommute => "Morning Commute",
            TimeOfDay::EveningCommute => "Evening Commute",
            TimeOfDay::MidDay => "Mid-day",
            TimeOfDay::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calendar facts about the requested departure time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeContext {
    pub hour: u32,
    pub is_weekend: bool,
    pub time_of_day: TimeOfDay,
    pub readable_date: String,
}

impl TimeContext {
    /// Interprets `datetime` as wall-clock time. RFC 3339 input keeps the
    /// clock time of its own offset; nothing is converted between zones.
    pub fn analyze(datetime: &str) -> Result<Self, OmniflowError> {
        let datetime = datetime.trim();
        let parsed = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(datetime, format).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(datetime)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
            .ok_or_else(|| {
                OmniflowError::InvalidInput(format!(
                    "unrecognized departure time '{datetime}', expected YYYY-MM-DDTHH:MM"
                ))
            })?;
        Ok(Self::from_datetime(&parsed))
    }

    pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
        let hour = datetime.hour();
        Self {
            hour,
            is_weekend: matches!(datetime.weekday(), Weekday::Sat | Weekday::Sun),
            time_of_day: TimeOfDay::from_hour(hour),
            readable_date: datetime.format("%A, %B %-d").to_string(),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "Time: {}:00 ({}). Day: {} ({}).",
            self.hour,
            self.time_of_day,
            self.readable_date,
            if self.is_weekend { "Weekend" } else { "Weekday" }
        )
    }

    /// Labels for the forecast window starting at the departure hour.
    pub fn forecast_hours(&self) -> Vec<String> {
        chart_hours(self.hour)
    }
}
