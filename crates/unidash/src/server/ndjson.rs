//! Newline-delimited JSON presenter for the MAC search.

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio_stream::StreamExt;

use unidash_core::{SearchEvent, SearchStream};

pub(crate) const CONTENT_TYPE: &str = "application/x-ndjson";

fn encode(event: &SearchEvent) -> Result<Bytes, serde_json::Error> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Stream every event as one JSON line, flushed as it is produced.
pub(crate) fn stream_response(events: SearchStream) -> Response {
    let body = Body::from_stream(events.map(|event| encode(&event)));
    (
        [
            (header::CONTENT_TYPE, CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
            // Keep reverse proxies from buffering the progress lines.
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lines_end_with_newline() {
        let line = encode(&SearchEvent::Progress {
            checked: 1,
            total: 2,
            percent: 50,
        })
        .unwrap();
        assert_eq!(
            line.as_ref(),
            b"{\"type\":\"progress\",\"checked\":1,\"total\":2,\"percent\":50}\n"
        );
    }
}
