//! Per-exchange debug trace lines.
//!
//! Enabled by [`ClientConfig::debug`](crate::ClientConfig::debug). Lines go
//! to the `tradewire::trace` target at `info` level, so an operator can
//! route them separately with `RUST_LOG=tradewire::trace=info`.

use tradewire_protocol::{Request, Response, Value};

pub(crate) fn outgoing(request: &Request) {
    tracing::info!(
        target: "tradewire::trace",
        "[TX] {} token={}",
        request.kind(),
        request.session_token
    );
}

pub(crate) fn incoming(response: &Response) {
    tracing::info!(
        target: "tradewire::trace",
        "[RX] success={} message={} data_type={} data={}",
        response.success,
        response.message,
        response.data.type_name(),
        render(&response.data)
    );
}

/// JSON rendering of a decoded value, for humans.
#[cfg(feature = "json")]
pub(crate) fn render(data: &Value) -> String {
    serde_json::to_string(data).unwrap_or_else(|_| data.type_name().to_string())
}

#[cfg(not(feature = "json"))]
pub(crate) fn render(data: &Value) -> String {
    format!("{data:?}")
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn test_render_shows_tagged_json() {
        assert_eq!(
            render(&Value::Str("tok-123".into())),
            r#"{"type":"Str","value":"tok-123"}"#
        );
    }
}
