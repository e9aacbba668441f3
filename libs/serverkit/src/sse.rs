use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::{borrow::Cow, convert::Infallible, time::Duration};

/// Wrap a typed stream into an SSE stream with JSON payloads and a constant
/// `event:` name. Serialization failures degrade to a tiny text marker
/// instead of breaking the stream.
pub fn wrap_stream_named<T, U>(
    stream: U,
    event_name: Cow<'static, str>,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    T: Serialize,
    U: Stream<Item = T>,
{
    stream.map(move |msg| {
        let ev = Event::default()
            .event(&event_name)
            .json_data(&msg)
            .unwrap_or_else(|_| {
                Event::default()
                    .event(&event_name)
                    .data("serialization_error")
            });
        Ok(ev)
    })
}

/// Turn a typed stream into an SSE response with a constant `event:` name.
/// Includes periodic keepalive pings to avoid idle timeouts.
pub fn sse_response_named<T, U>(
    stream: U,
    event_name: impl Into<Cow<'static, str>> + 'static,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + 'static,
    U: Stream<Item = T> + Send + 'static,
{
    Sse::new(wrap_stream_named(stream, event_name.into())).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}
