use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use omniflow_llm::error_for_status;
use omniflow::{
    DetailedWeather, Geocoder, LocationData, OmniflowError, RouteComposition, RouteResult,
    RouteStats, Router, TextLlm, TripPlanner, WeatherProvider,
};

struct MapGeocoder;

#[async_trait]
impl Geocoder for MapGeocoder {
    async fn resolve(&self, query: &str) -> Option<LocationData> {
        match query {
            "Berlin" => Some(LocationData {
                name: "Berlin, Germany".to_string(),
                lat: 52.52,
                lon: 13.405,
            }),
            "Potsdam" => Some(LocationData {
                name: "Potsdam, Germany".to_string(),
                lat: 52.3906,
                lon: 13.0645,
            }),
            _ => None,
        }
    }

    async fn reverse_resolve(&self, lat: f64, _lon: f64) -> Option<String> {
        (lat > 52.0).then(|| "Mitte, Berlin".to_string())
    }
}

#[derive(Clone, Default)]
struct RecordingWeather {
    points: Arc<Mutex<Vec<(f64, f64, String)>>>,
}

#[async_trait]
impl WeatherProvider for RecordingWeather {
    async fn forecast(&self, lat: f64, lon: f64, departure: &str) -> Option<DetailedWeather> {
        self.points
            .lock()
            .unwrap()
            .push((lat, lon, departure.to_string()));
        Some(DetailedWeather::from_code(8.0, 70, 63, 20.0, true))
    }
}

struct NoWeather;

#[async_trait]
impl WeatherProvider for NoWeather {
    async fn forecast(&self, _lat: f64, _lon: f64, _departure: &str) -> Option<DetailedWeather> {
        None
    }
}

struct FixedRouter(Option<RouteResult>);

#[async_trait]
impl Router for FixedRouter {
    async fn route(&self, _from: &LocationData, _to: &LocationData) -> Option<RouteResult> {
        self.0.clone()
    }
}

#[derive(Default)]
struct CountingLlm {
    calls: AtomicUsize,
}

#[async_trait]
impl TextLlm for CountingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, OmniflowError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(r#"{"travelTime": "41 min", "congestionLevel": "Moderate"}"#.to_string())
    }
}

/// Slowly hits a quota error for trips leaving Potsdam.
struct SlowFromPotsdamLlm;

#[async_trait]
impl TextLlm for SlowFromPotsdamLlm {
    async fn complete(&self, prompt: &str) -> Result<String, OmniflowError> {
        if prompt.contains(r#"from "Potsdam, Germany""#) {
            tokio::time::sleep(Duration::from_millis(100)).await;
            return Err(error_for_status(402, String::new()));
        }
        Ok(r#"{"travelTime": "41 min", "congestionLevel": "Moderate"}"#.to_string())
    }
}

fn berlin_potsdam() -> RouteResult {
    RouteResult {
        polyline: vec![[52.52, 13.405], [52.45, 13.2], [52.3906, 13.0645]],
        stats: RouteStats {
            distance_meters: 35_000.0,
            duration_seconds: 2_400.0,
        },
        composition: Some(RouteComposition::new(80, vec!["A 115".to_string()])),
    }
}

#[tokio::test]
async fn plan_combines_weather_route_and_prediction() {
    let planner = TripPlanner::new(
        MapGeocoder,
        RecordingWeather::default(),
        FixedRouter(Some(berlin_potsdam())),
        CountingLlm::default(),
    );

    let plan = planner
        .plan("Berlin", "Potsdam", "2024-05-14T17:00")
        .await
        .unwrap();

    assert_eq!(plan.origin.name, "Berlin, Germany");
    assert_eq!(plan.destination.name, "Potsdam, Germany");
    assert_eq!(plan.prediction.travel_time_estimate, "41 min");
    assert_eq!(
        plan.prediction.route_coordinates.as_ref().map(Vec::len),
        Some(3)
    );
    assert_eq!(
        plan.prediction.route_stats.map(|stats| stats.distance_meters),
        Some(35_000.0)
    );
    assert_eq!(
        plan.prediction.weather_impact,
        "Rain: Slight, moderate and heavy intensity"
    );
    assert_eq!(plan.prediction.chart_data[0].time, "17:00");
}

#[tokio::test]
async fn weather_is_fetched_at_the_destination() {
    let weather = RecordingWeather::default();
    let planner = TripPlanner::new(
        MapGeocoder,
        weather.clone(),
        FixedRouter(None),
        CountingLlm::default(),
    );

    planner
        .plan("Berlin", "Potsdam", "2024-05-14T08:00")
        .await
        .unwrap();

    let points = weather.points.lock().unwrap().clone();
    assert_eq!(
        points,
        vec![(52.3906, 13.0645, "2024-05-14T08:00".to_string())]
    );
    assert_eq!(planner.predictor().llm().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_route_and_weather_still_predict() {
    let planner = TripPlanner::new(MapGeocoder, NoWeather, FixedRouter(None), CountingLlm::default());

    let plan = planner
        .plan("Berlin", "Potsdam", "2024-05-14T12:00")
        .await
        .unwrap();

    assert_eq!(plan.prediction.route_coordinates, None);
    assert_eq!(plan.prediction.route_stats, None);
    assert_eq!(plan.prediction.weather_impact, "Unknown");
}

#[tokio::test]
async fn unknown_address_fails_without_calling_the_model() {
    let planner = TripPlanner::new(
        MapGeocoder,
        NoWeather,
        FixedRouter(Some(berlin_potsdam())),
        CountingLlm::default(),
    );

    let err = planner
        .plan("Berlin", "Atlantis", "2024-05-14T12:00")
        .await
        .unwrap_err();

    match err {
        OmniflowError::LocationNotFound { role, query } => {
            assert_eq!(role, "destination");
            assert_eq!(query, "Atlantis");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(planner.predictor().llm().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn superseded_plan_is_dropped_even_when_it_fails() {
    let planner = TripPlanner::new(MapGeocoder, NoWeather, FixedRouter(None), SlowFromPotsdamLlm);

    let (first, second) = tokio::join!(
        planner.plan_latest("Potsdam", "Berlin", "2024-05-14T08:00"),
        planner.plan_latest("Berlin", "Potsdam", "2024-05-14T08:00")
    );

    assert!(matches!(first, Ok(None)), "stale failure leaked: {first:?}");
    let second = second.unwrap().expect("newest plan is kept");
    assert_eq!(second.origin.name, "Berlin, Germany");
}

#[tokio::test]
async fn current_location_falls_back_to_coordinates() {
    let planner = TripPlanner::new(MapGeocoder, NoWeather, FixedRouter(None), CountingLlm::default());

    assert_eq!(
        planner.current_location_name(52.5200, 13.4050).await,
        "Mitte, Berlin"
    );
    assert_eq!(
        planner.current_location_name(48.137154, 11.576124).await,
        "48.1372, 11.5761"
    );
}
