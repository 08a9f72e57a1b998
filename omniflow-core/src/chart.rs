use rand::Rng;

use crate::{ChartPoint, CongestionLevel};

pub const CHART_POINTS: usize = 5;
const MAX_JITTER: i16 = 7;

/// Five hourly congestion points starting at `start_hour`, jittered around the
/// level's base value.
pub fn synthesize_chart(level: CongestionLevel, start_hour: u32) -> Vec<ChartPoint> {
    synthesize_chart_with(&mut rand::thread_rng(), level, start_hour)
}

pub fn synthesize_chart_with<R: Rng + ?Sized>(
    rng: &mut R,
    level: CongestionLevel,
    start_hour: u32,
) -> Vec<ChartPoint> {
    let base = i16::from(level.base_value());
    (0..CHART_POINTS as u32)
        .map(|offset| {
            let jitter = rng.gen_range(-MAX_JITTER..=MAX_JITTER);
            let value = (base + jitter).clamp(0, 100) as u8;
            ChartPoint::at_hour(start_hour % 24 + offset, value)
        })
        .collect()
}

/// `HH:00` labels for the hours covered by a chart starting at `start_hour`.
pub fn chart_hours(start_hour: u32) -> Vec<String> {
    (0..CHART_POINTS as u32)
        .map(|offset| format!("{:02}:00", (start_hour % 24 + offset) % 24))
        .collect()
}
