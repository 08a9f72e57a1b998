use async_trait::async_trait;
use omniflow_core::{
    DetailedWeather, LocationData, OmniflowError, PredictionResult, RouteResult, TextLlm,
};
use serde::Serialize;

use crate::{RequestTracker, TrafficPredictor, TripRequest};

/// Resolves free-text addresses to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, query: &str) -> Option<LocationData>;

    /// Display name for a coordinate pair, if the service knows one.
    async fn reverse_resolve(&self, lat: f64, lon: f64) -> Option<String>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Forecast for the hour of `departure` at the given point.
    async fn forecast(&self, lat: f64, lon: f64, departure: &str) -> Option<DetailedWeather>;
}

#[async_trait]
pub trait Router: Send + Sync {
    async fn route(&self, from: &LocationData, to: &LocationData) -> Option<RouteResult>;
}

/// Resolved endpoints plus the prediction for the trip between them.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub origin: LocationData,
    pub destination: LocationData,
    pub prediction: PredictionResult,
}

/// Runs the full trip flow: geocode both ends, fetch weather and the route,
/// then ask the model.
///
/// Weather and routing are best-effort; only the two addresses must resolve.
pub struct TripPlanner<G, W, R, L> {
    geocoder: G,
    weather: W,
    router: R,
    predictor: TrafficPredictor<L>,
    tracker: RequestTracker,
}

impl<G, W, R, L> TripPlanner<G, W, R, L>
where
    G: Geocoder,
    W: WeatherProvider,
    R: Router,
    L: TextLlm,
{
    pub fn new(geocoder: G, weather: W, router: R, llm: L) -> Self {
        Self {
            geocoder,
            weather,
            router,
            predictor: TrafficPredictor::new(llm),
            tracker: RequestTracker::new(),
        }
    }

    pub fn predictor(&self) -> &TrafficPredictor<L> {
        &self.predictor
    }

    pub async fn plan(
        &self,
        origin: &str,
        destination: &str,
        departure: &str,
    ) -> Result<TripPlan, OmniflowError> {
        let (from, to) = futures::join!(
            self.geocoder.resolve(origin),
            self.geocoder.resolve(destination)
        );
        let from = from.ok_or_else(|| OmniflowError::LocationNotFound {
            role: "origin".to_string(),
            query: origin.to_string(),
        })?;
        let to = to.ok_or_else(|| OmniflowError::LocationNotFound {
            role: "destination".to_string(),
            query: destination.to_string(),
        })?;

        let weather = self.weather.forecast(to.lat, to.lon, departure).await;
        if weather.is_none() {
            tracing::warn!(destination = %to.name, "weather unavailable, continuing without it");
        }

        let route = self.router.route(&from, &to).await;
        let (stats, composition, polyline) = match route {
            Some(route) => (Some(route.stats), route.composition, Some(route.polyline)),
            None => {
                tracing::warn!(origin = %from.name, destination = %to.name, "route unavailable");
                (None, None, None)
            }
        };

        let request = TripRequest::new(from.name.as_str(), to.name.as_str(), departure)
            .with_weather(weather)
            .with_route(stats, composition);
        let mut prediction = self.predictor.predict(&request).await?;
        if let Some(polyline) = polyline {
            prediction = prediction.with_route_coordinates(polyline);
        }

        Ok(TripPlan {
            origin: from,
            destination: to,
            prediction,
        })
    }

    /// Like [`plan`](Self::plan), but yields `Ok(None)` when a newer plan was
    /// requested while this one was running, whether it succeeded or not.
    pub async fn plan_latest(
        &self,
        origin: &str,
        destination: &str,
        departure: &str,
    ) -> Result<Option<TripPlan>, OmniflowError> {
        let token = self.tracker.issue();
        let outcome = self.plan(origin, destination, departure).await;
        self.tracker.accept(token, outcome).transpose()
    }

    /// Name for the user's current position, or the raw coordinates when the
    /// geocoder has none.
    pub async fn current_location_name(&self, lat: f64, lon: f64) -> String {
        match self.geocoder.reverse_resolve(lat, lon).await {
            Some(name) if !name.trim().is_empty() => name,
            _ => format!("{lat:.4}, {lon:.4}"),
        }
    }
}
