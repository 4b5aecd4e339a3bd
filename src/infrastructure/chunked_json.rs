// Chunked JSON streaming: each message is a 4-byte big-endian length followed
// by the (optionally Brotli-compressed) JSON payload.
use crate::infrastructure::http_response::{brotli, JSON};
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;

/// Create a chunked streaming response from a stream of messages
pub async fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so Content-Encoding stays unset.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, JSON)
        .header(header::TRANSFER_ENCODING, "chunked")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single message to a length-prefixed chunk
pub async fn serialize_chunk<T: Serialize>(msg: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    let payload = if compress { brotli(json).await? } else { json };

    let length = u32::try_from(payload.len()).map_err(std::io::Error::other)?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream a rendering of every value a watch channel takes, starting with
/// the current one.
pub async fn stream_from_watch<T, V, F>(
    rx: tokio::sync::watch::Receiver<T>,
    render: F,
    compress: bool,
) -> impl IntoResponse
where
    T: Clone + Send + Sync + 'static,
    V: Serialize + Send + Sync + 'static,
    F: Fn(&T) -> V + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut updates = tokio_stream::wrappers::WatchStream::new(rx);
        while let Some(value) = updates.next().await {
            yield render(&value);
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_chunk_is_length_prefixed() {
        let chunk = serialize_chunk(&json!({"online": true}), false).await.unwrap();

        let body = br#"{"online":true}"#;
        assert_eq!(&chunk[..4], &(body.len() as u32).to_be_bytes());
        assert_eq!(&chunk[4..], body);
    }

    #[tokio::test]
    async fn test_compressed_chunk_length_matches() {
        let chunk = serialize_chunk(&json!({"history": vec![42.0; 100]}), true).await.unwrap();

        let declared = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(declared, chunk.len() - 4);
    }
}
