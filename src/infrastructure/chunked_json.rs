// Chunked live-reading stream: each chunk is a 4-byte big-endian length
// followed by one JSON-encoded reading
use crate::domain::live::LiveReading;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;

pub async fn chunked_json_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = LiveReading> + Send + 'static,
{
    let byte_stream = stream.then(move |reading| async move { serialize_chunk(reading, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding header.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn serialize_chunk(reading: LiveReading, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&reading)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(payload.len() as u32);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Streaming response that forwards readings until the receiver closes
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<LiveReading>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(reading) = rx.recv().await {
            yield reading;
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

    #[tokio::test]
    async fn test_chunk_is_length_prefixed() {
        let reading = LiveReading {
            id: 7,
            sensor_id: "s1".into(),
            ts: "2024-01-01T10:00:00".into(),
            value: 21.5,
            attributes: None,
        };
        let chunk = serialize_chunk(reading.clone(), false).await.unwrap();
        let len = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(len, chunk.len() - 4);

        let decoded: LiveReading = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(decoded, reading);
    }
}
