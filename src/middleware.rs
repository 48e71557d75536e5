use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

const STATIC_EXTENSIONS: [&str; 12] = [
    "css", "js", "png", "jpg", "jpeg", "gif", "ico", "svg", "woff", "woff2", "ttf", "eot",
];

fn is_static_file(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((_, ext)) => STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

fn should_log(path: &str) -> bool {
    if is_static_file(path) || path.starts_with("/health") {
        return false;
    }
    path.starts_with("/api") || path.starts_with("/account")
}

/// First ten characters of a bearer token, enough to correlate requests.
pub fn token_preview(header: &str) -> String {
    match header.strip_prefix("Bearer ") {
        Some(token) if header.len() > 20 => {
            let head: String = token.chars().take(10).collect();
            format!("Bearer {head}...")
        }
        _ => "Bearer [token]".to_string(),
    }
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if should_log(path) {
        let auth = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        debug!(
            method = %req.method(),
            path,
            has_auth = auth.is_some(),
            "incoming request"
        );
        if let Some(value) = auth.filter(|v| !v.is_empty()) {
            debug!(authorization = %token_preview(value), "authorization header");
        }
    }
    next.run(req).await
}
