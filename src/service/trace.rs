use axum::http::Request;
use std::sync::Arc;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{MakeSpan, TraceLayer},
};
use tracing::{Span, info_span};

pub type HttpTraceLayer = TraceLayer<SharedClassifier<ServerErrorsAsFailures>, HttpMakeSpan>;

/// 为某个服务实例创建 HTTP 追踪层，span 中带上服务名
pub fn http_trace_layer(service: &str) -> HttpTraceLayer {
    TraceLayer::new_for_http().make_span_with(HttpMakeSpan {
        service: Arc::from(service),
    })
}

#[derive(Clone, Debug)]
pub struct HttpMakeSpan {
    service: Arc<str>,
}

impl<B> MakeSpan<B> for HttpMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        info_span!(
            "http.request",
            service = %self.service,
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}
