// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{Method, Request, Response, header::USER_AGENT},
};
use pkce_demo_handlers::AppState;
use tower_http::trace::TraceLayer;
use tracing::Span;

#[inline]
fn http_method<B>(request: &Request<B>) -> &'static str {
    match request.method() {
        &Method::OPTIONS => "OPTIONS",
        &Method::GET => "GET",
        &Method::POST => "POST",
        &Method::PUT => "PUT",
        &Method::DELETE => "DELETE",
        &Method::HEAD => "HEAD",
        &Method::TRACE => "TRACE",
        &Method::CONNECT => "CONNECT",
        &Method::PATCH => "PATCH",
        _other => "_OTHER",
    }
}

fn http_route<B>(request: &Request<B>) -> Option<&str> {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
}

/// The span of an incoming request.
///
/// The query is not recorded, as it carries the authorization code on the
/// callback.
fn make_http_span<B>(req: &Request<B>) -> Span {
    let method = http_method(req);
    let route = http_route(req);

    let span_name = if let Some(route) = route.as_ref() {
        format!("{method} {route}")
    } else {
        method.to_owned()
    };

    let span = tracing::info_span!(
        "http.server.request",
        "otel.name" = span_name,
        "http.request.method" = method,
        "http.route" = tracing::field::Empty,
        "http.response.status_code" = tracing::field::Empty,
        "url.path" = req.uri().path(),
        "user_agent.original" = tracing::field::Empty,
    );

    if let Some(route) = route.as_ref() {
        span.record("http.route", route);
    }

    if let Some(user_agent) = req
        .headers()
        .get(USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
    {
        span.record("user_agent.original", user_agent);
    }

    span
}

fn on_http_response<B>(response: &Response<B>, latency: Duration, span: &Span) {
    let latency_ms: u64 = latency.as_millis().try_into().unwrap_or(u64::MAX);
    span.record("http.response.status_code", response.status().as_u16());
    tracing::debug!(
        status = %response.status(),
        latency_ms,
        "Finished processing request"
    );
}

/// Build the service of the web server
pub fn build_router(state: AppState) -> Router {
    pkce_demo_handlers::router()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_http_span::<Body>)
                .on_response(on_http_response::<Body>),
        )
        .with_state(state)
}
