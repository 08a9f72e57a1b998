mod error;
mod llm;
mod prediction;
mod trip;
mod weather;

pub mod chart;
pub mod normalize;

pub use chart::{synthesize_chart, synthesize_chart_with};
pub use error::OmniflowError;
pub use llm::TextLlm;
pub use normalize::NormalizeContext;
pub use prediction::{
    ChartPoint, CongestionLevel, PredictionResult, RouteAlternative, RouteLink, RouteSegment,
    TrafficBreakdown,
};
pub use trip::{LocationData, RouteComposition, RouteResult, RouteStats, RouteStep};
pub use weather::{wmo_description, DetailedWeather};
