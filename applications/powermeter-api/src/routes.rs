use crate::handlers::{self, dates, kwh, meter, watts, AppState};
use axum::{extract::Request, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

pub fn create_router(state: AppState) -> Router {
    let power_routes = Router::new()
        .route("/", get(handlers::status))
        .route("/kwh/date", get(dates::usage))
        .route("/kwh/date/{year}", get(dates::get_year))
        .route("/kwh/date/{year}/{month}", get(dates::get_month))
        .route("/kwh/date/{year}/{month}/{day}", get(dates::get_day))
        .route("/kwh/{type}", get(kwh::get_kwh))
        .route("/kwh/{type}/{count}", get(kwh::get_kwh_count))
        .route("/watts", get(watts::get_watts))
        .route("/watts/hour", get(watts::get_last_hour))
        .route("/watts/{interval}", get(watts::get_watts_interval))
        .route(
            "/meter/total",
            get(meter::get_total).put(meter::put_total),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/power", power_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request| {
                            tracing::span!(
                                Level::INFO,
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                            )
                        })
                        .on_request(|_request: &Request, _span: &tracing::Span| {
                            tracing::event!(Level::DEBUG, "received request");
                        })
                        .on_response(
                            |response: &axum::response::Response,
                             latency: std::time::Duration,
                             _span: &tracing::Span| {
                                tracing::event!(
                                    Level::INFO,
                                    status = response.status().as_u16(),
                                    latency = ?latency,
                                    "request completed"
                                );
                            },
                        )
                        .on_failure(
                            |error: tower_http::classify::ServerErrorsFailureClass,
                             _latency: std::time::Duration,
                             _span: &tracing::Span| {
                                tracing::event!(Level::ERROR, %error, "request failed");
                            },
                        ),
                )
                .layer(CorsLayer::permissive()),
        )
}
