// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Assigns x-request-id headers and opens one span per HTTP request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use axum::body::Body;
use http::{HeaderName, Request};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Sequential request ids prefixed with the process start time
#[derive(Clone)]
pub struct SequentialRequestId {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl Default for SequentialRequestId {
    fn default() -> Self {
        Self {
            prefix: format!("req_{:x}", chrono::Utc::now().timestamp()),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl MakeRequestId for SequentialRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = format!("{}_{}", self.prefix, self.counter.fetch_add(1, Ordering::Relaxed));
        id.parse().ok().map(RequestId::new)
    }
}

/// Layers that assign an id to requests lacking one and echo it on responses
#[must_use]
pub fn request_id_layers() -> (SetRequestIdLayer<SequentialRequestId>, PropagateRequestIdLayer) {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    (
        SetRequestIdLayer::new(header.clone(), SequentialRequestId::default()),
        PropagateRequestIdLayer::new(header),
    )
}

/// Span for one HTTP request, used by `TraceLayer::make_span_with`
pub fn make_request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = tracing::field::Empty,
    )
}
