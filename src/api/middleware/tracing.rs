//! HTTP request/response tracing middleware.

use axum::extract::{MatchedPath, Request};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Span factory naming each request by its route template, so
/// `/posts/1` and `/posts/2` group under `/posts/{post_id}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteSpan;

impl<B> MakeSpan<B> for RouteSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str)
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            route,
            uri = %request.uri(),
        )
    }
}

/// Creates a tracing middleware for HTTP requests.
///
/// One `INFO` span per request (method, route template, URI). Responses are
/// logged at `INFO` with latency in milliseconds; 5xx responses are also
/// reported at `ERROR`.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET route=/group/{slug} uri=/group/cats}: finished processing request latency=12 ms status=200
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RouteSpan> {
    TraceLayer::new_for_http()
        .make_span_with(RouteSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}
