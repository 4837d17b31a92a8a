//! B3 trace identifiers forwarded on outbound collaborator calls.

/// Header carrying the request trace id.
pub const TRACE_ID_HEADER: &str = "X-B3-TraceId";

/// Header carrying the caller's span id.
pub const SPAN_ID_HEADER: &str = "X-B3-SpanId";

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Trace identifiers of the inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    pub request_id: String,
}

impl TraceContext {
    /// Stamp every non-empty identifier onto `builder`.
    pub fn apply(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (name, value) in self.headers() {
            builder = builder.header(name, value);
        }
        builder
    }

    /// Header name/value pairs, skipping empty identifiers.
    pub fn headers(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (TRACE_ID_HEADER, self.trace_id.as_str()),
            (SPAN_ID_HEADER, self.span_id.as_str()),
            (REQUEST_ID_HEADER, self.request_id.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
    }
}
