// HTTP response utilities with optional Brotli encoding
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Response, StatusCode},
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

pub const JSON: &str = "application/json";
pub const SVG: &str = "image/svg+xml";

/// Whether the client advertised Brotli support.
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').any(|enc| enc.trim().starts_with("br")))
        .unwrap_or(false)
}

pub async fn brotli(bytes: Vec<u8>) -> std::io::Result<Vec<u8>> {
    let mut encoder = BrotliEncoder::new(std::io::Cursor::new(bytes));
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

/// Build a 200 response, compressing the body when `compress` is set.
pub async fn encoded_response(
    body: Vec<u8>,
    content_type: &'static str,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let (body_bytes, content_encoding) = if compress {
        let original_len = body.len();
        let compressed = brotli(body).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!("Compressed {} -> {} bytes", original_len, compressed.len());
        (compressed, Some("br"))
    } else {
        (body, None)
    };

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, HeaderValue::from(body_bytes.len()))
        .header(header::VARY, "accept-encoding");

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn json_response<T: Serialize>(value: &T, compress: bool) -> Result<Response<Body>, StatusCode> {
    let body = serde_json::to_vec(value).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    encoded_response(body, JSON, compress).await
}

pub async fn svg_response(svg: String, compress: bool) -> Result<Response<Body>, StatusCode> {
    encoded_response(svg.into_bytes(), SVG, compress).await
}
