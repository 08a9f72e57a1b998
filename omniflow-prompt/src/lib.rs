mod builder;
mod context;
mod template;
mod time_context;

pub use builder::{TrafficPromptBuilder, TripContext};
pub use context::{route_context, weather_context, ROUTE_UNAVAILABLE, WEATHER_UNAVAILABLE};
pub use template::PromptTemplate;
pub use time_context::{TimeContext, TimeOfDay};
