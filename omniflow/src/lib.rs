//! Traffic forecasts for a trip, produced by a large language model.
//!
//! ```no_run
//! use omniflow::{predict_traffic, Settings, TripRequest};
//!
//! # async fn run() -> Result<(), omniflow::OmniflowError> {
//! let settings = Settings::from_env()?;
//! let request = TripRequest::new("Berlin Hbf", "Potsdam", "2024-05-14T07:30");
//! let prediction = predict_traffic(&request, &settings).await?;
//! println!("{}", prediction.travel_time_estimate);
//! # Ok(())
//! # }
//! ```

mod planner;
mod predictor;
mod settings;
mod tracker;

pub use planner::{Geocoder, Router, TripPlan, TripPlanner, WeatherProvider};
pub use predictor::{
    predict_traffic, prepare_prompt, PreparedPrompt, TrafficPredictor, TripRequest,
};
pub use settings::{
    Settings, SettingsStore, StoredSettings, ENV_API_KEY, ENV_BASE_URL, ENV_MODEL, ENV_PROVIDER,
    ENV_REFERER, ENV_SHARED_KEY,
};
pub use tracker::{RequestToken, RequestTracker};

pub use omniflow_core::normalize::{normalize, NormalizeContext};
pub use omniflow_core::{
    ChartPoint, CongestionLevel, DetailedWeather, LocationData, OmniflowError, PredictionResult,
    RouteAlternative, RouteComposition, RouteLink, RouteResult, RouteSegment, RouteStats,
    RouteStep, TextLlm, TrafficBreakdown,
};
pub use omniflow_llm::{Provider, ProviderDispatcher, ProviderDispatcherBuilder};
pub use omniflow_prompt::{TimeContext, TimeOfDay, TrafficPromptBuilder};
