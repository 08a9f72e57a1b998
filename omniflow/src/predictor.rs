use omniflow_core::normalize::{self, NormalizeContext};
use omniflow_core::{
    DetailedWeather, OmniflowError, PredictionResult, RouteComposition, RouteStats, TextLlm,
};
use omniflow_prompt::{TimeContext, TrafficPromptBuilder, TripContext};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::{RequestTracker, Settings};

/// Inputs of a single prediction, with upstream data already fetched.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    /// Local wall-clock departure, e.g. `2024-05-14T07:30`.
    pub departure: String,
    #[serde(default)]
    pub weather: Option<DetailedWeather>,
    #[serde(default)]
    pub route_stats: Option<RouteStats>,
    #[serde(default)]
    pub route_composition: Option<RouteComposition>,
}

impl TripRequest {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure: departure.into(),
            ..Self::default()
        }
    }

    pub fn with_weather(mut self, weather: Option<DetailedWeather>) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_route(
        mut self,
        stats: Option<RouteStats>,
        composition: Option<RouteComposition>,
    ) -> Self {
        self.route_stats = stats;
        self.route_composition = composition;
        self
    }
}

/// A rendered prompt together with the time facts it was built from.
#[derive(Clone, Debug)]
pub struct PreparedPrompt {
    pub text: String,
    pub time: TimeContext,
    pub weather: Option<DetailedWeather>,
}

/// Analyzes the departure time, normalizes the weather and renders the
/// prompt for `request`.
pub fn prepare_prompt(
    prompts: &TrafficPromptBuilder,
    request: &TripRequest,
) -> Result<PreparedPrompt, OmniflowError> {
    let time = TimeContext::analyze(&request.departure)?;
    let weather = request.weather.clone().map(DetailedWeather::normalized);
    let text = prompts.build(&TripContext {
        origin: &request.origin,
        destination: &request.destination,
        time: &time,
        weather: weather.as_ref(),
        route_stats: request.route_stats.as_ref(),
        route_composition: request.route_composition.as_ref(),
    })?;
    Ok(PreparedPrompt {
        text,
        time,
        weather,
    })
}

/// Prompt → model → normalized prediction.
pub struct TrafficPredictor<L> {
    llm: L,
    prompts: TrafficPromptBuilder,
    tracker: RequestTracker,
}

impl<L: TextLlm> TrafficPredictor<L> {
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            prompts: TrafficPromptBuilder::new(),
            tracker: RequestTracker::new(),
        }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Renders the prompt without contacting the model.
    pub fn prepare(&self, request: &TripRequest) -> Result<PreparedPrompt, OmniflowError> {
        prepare_prompt(&self.prompts, request)
    }

    /// Runs one prediction. Provider, credential and input errors are
    /// returned; unusable model output becomes a degraded result instead.
    pub async fn predict(&self, request: &TripRequest) -> Result<PredictionResult, OmniflowError> {
        let span = tracing::info_span!(
            "predict_traffic",
            origin = %request.origin,
            destination = %request.destination,
            departure = %request.departure,
        );

        async move {
            let prepared = self.prepare(request)?;
            let raw = self.llm.complete(&prepared.text).await?;

            let context = NormalizeContext::new(prepared.time.hour)
                .with_weather(prepared.weather)
                .with_route_stats(request.route_stats);
            let result = normalize::normalize(&raw, &context);
            tracing::info!(
                congestion = %result.congestion_level,
                travel_time = %result.travel_time_estimate,
                "prediction ready"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Like [`predict`](Self::predict), but yields `Ok(None)` when another
    /// call on this predictor started before this one finished. Errors of a
    /// superseded call are dropped as well.
    pub async fn predict_latest(
        &self,
        request: &TripRequest,
    ) -> Result<Option<PredictionResult>, OmniflowError> {
        let token = self.tracker.issue();
        let outcome = self.predict(request).await;
        self.tracker.accept(token, outcome).transpose()
    }
}

/// One-shot prediction using the provider selected in `settings`.
///
/// The credential is checked before anything else, so a missing key fails
/// without touching the network.
pub async fn predict_traffic(
    request: &TripRequest,
    settings: &Settings,
) -> Result<PredictionResult, OmniflowError> {
    let dispatcher = settings.dispatcher()?;
    TrafficPredictor::new(dispatcher).predict(request).await
}
