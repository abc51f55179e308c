use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use qalam::common::QalamError;
use qalam::process::Pipeline;
use qalam::upload::process_upload;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;

const IMAGE_FIELD: &str = "image_file";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

#[derive(Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct Base64ImageRequest {
    pub image_base64: String,
    pub filename: Option<String>,
}

pub struct ApiError(QalamError);

impl From<QalamError> for ApiError {
    fn from(err: QalamError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &QalamError) -> StatusCode {
    match err {
        QalamError::Input(_) | QalamError::Decode(_) | QalamError::InvalidImage(_) => {
            StatusCode::BAD_REQUEST
        }
        QalamError::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        QalamError::EngineTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        QalamError::Recognition(_) | QalamError::Processing(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        log::debug!("Responding {} ({})", status, self.0.kind());
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(pipeline: Arc<Pipeline>, max_workers: usize, body_limit: usize) -> Router {
    let ocr_routes = Router::new()
        .route("/translate_image", post(translate_image))
        .route("/translate_image_base64", post(translate_image_base64))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(AppState { pipeline });

    Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/health", get(|| async { "healthy" }))
        .merge(ocr_routes)
        .layer(GlobalConcurrencyLimitLayer::new(max_workers))
}

async fn translate_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TextResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| QalamError::Input(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| QalamError::Input(format!("Failed to read upload: {}", e)))?;
        log::info!("Received {} ({} bytes)", filename, bytes.len());

        let output = process_upload(&state.pipeline, Some(&filename), bytes.to_vec()).await?;
        return Ok(Json(TextResponse { text: output.text }));
    }

    Err(QalamError::Input("No image file provided".to_string()).into())
}

async fn translate_image_base64(
    State(state): State<AppState>,
    payload: Result<Json<Base64ImageRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, ApiError> {
    let Json(payload) =
        payload.map_err(|e| QalamError::Input(format!("Invalid request body: {}", e.body_text())))?;

    // Strip a "data:image/png;base64," prefix if present
    let base64_part = match payload.image_base64.split_once(',') {
        Some((_, data)) => data,
        None => payload.image_base64.as_str(),
    };

    let binary_data = STANDARD
        .decode(base64_part.trim())
        .map_err(|e| QalamError::Input(format!("Failed to decode base64 data: {}", e)))?;
    log::info!("Successfully decoded {} bytes of image data", binary_data.len());

    let output = process_upload(&state.pipeline, payload.filename.as_deref(), binary_data).await?;
    Ok(Json(TextResponse { text: output.text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use qalam::common::{PreprocessedRaster, Result};
    use qalam::image2text::{OcrConfig, OsdResult, RecognitionEngine};
    use qalam::process::ProcessorConfig;
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "qalam-test-boundary";

    struct FakeEngine {
        available: bool,
    }

    impl RecognitionEngine for FakeEngine {
        fn detect_script(&self, _raster: &PreprocessedRaster, _: &OcrConfig) -> Result<OsdResult> {
            Ok(OsdResult {
                script: "Latin".to_string(),
                confidence: Some(4.0),
            })
        }

        fn recognize(&self, _: &PreprocessedRaster, _: &str, _: &OcrConfig) -> Result<String> {
            if self.available {
                Ok("The quick\nbrown fox. |".to_string())
            } else {
                Err(QalamError::EngineUnavailable("tesseract not found".to_string()))
            }
        }
    }

    fn app(available: bool) -> Router {
        let config = ProcessorConfig::default();
        let pipeline = Arc::new(Pipeline::new(&config, Arc::new(FakeEngine { available })));
        router(pipeline, 4, 1024 * 1024)
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_fn(20, 10, |x, _| {
            if x % 5 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn multipart_request(name: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/translate_image")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn base64_request(json: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/translate_image_base64")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        use std::time::Duration;

        assert_eq!(status_for(&QalamError::Input("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&QalamError::Decode("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&QalamError::EngineUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&QalamError::EngineTimeout(Duration::from_secs(1))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&QalamError::Recognition("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let response = app(true)
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let response = app(true)
            .oneshot(multipart_request(IMAGE_FIELD, "page.png", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["text"], "The quick brown fox.");
    }

    #[tokio::test]
    async fn test_multipart_without_image_field() {
        let response = app(true)
            .oneshot(multipart_request("document", "page.png", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error"], "No image file provided");
    }

    #[tokio::test]
    async fn test_multipart_with_empty_filename() {
        let response = app(true)
            .oneshot(multipart_request(IMAGE_FIELD, "", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error"], "No selected file");
    }

    #[tokio::test]
    async fn test_base64_upload_with_data_url() {
        let data = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes()));
        let response = app(true)
            .oneshot(base64_request(serde_json::json!({ "image_base64": data })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["text"], "The quick brown fox.");
    }

    #[tokio::test]
    async fn test_invalid_base64_is_client_error() {
        let response = app(true)
            .oneshot(base64_request(serde_json::json!({ "image_base64": "%%%not-base64%%%" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_client_error() {
        let data = STANDARD.encode(b"plain text, not pixels");
        let response = app(true)
            .oneshot(base64_request(serde_json::json!({ "image_base64": data })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_engine_is_service_unavailable() {
        let data = STANDARD.encode(png_bytes());
        let response = app(false)
            .oneshot(base64_request(serde_json::json!({ "image_base64": data, "filename": "scan.png" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = read_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("unavailable"));
    }
}
