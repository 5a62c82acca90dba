use axum::body::Body;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Размер в читаемом виде: 950 B, 12.4 KB, 3.1 MB
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Middleware для логирования HTTP запросов
///
/// Пишет в tracing: метод, путь, статус, длительность и размер ответа
/// (по Content-Length, если он известен).
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let size = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(format_size)
        .unwrap_or_else(|| "-".into());

    if response.status().is_server_error() {
        tracing::error!(%method, path = %path, status, elapsed_ms, size = %size, "request");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, path = %path, status, elapsed_ms, size = %size, "request");
    } else {
        tracing::info!(%method, path = %path, status, elapsed_ms, size = %size, "request");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(950), "950 B");
        assert_eq!(format_size(12_700), "12.4 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
