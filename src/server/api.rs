//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::core::models::{ModelConfig, ToolMessage, ToolParameters, UploadedFile};
use crate::processors::markdown::MarkdownProcessor;

/// Application state
#[derive(Clone)]
pub struct AppState {
    processor: Arc<MarkdownProcessor>,
}

impl AppState {
    /// Wrap a processor for use by the handlers
    pub fn new(processor: MarkdownProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Markdown translation request
#[derive(Debug, Deserialize)]
pub struct MarkdownTranslateRequest {
    /// Document text; omitted means no file was uploaded
    pub content: Option<String>,
    /// Name of the uploaded file, for logging only
    pub file_name: Option<String>,
    /// Free-text steering instructions
    #[serde(default)]
    pub query: String,
    /// Model override for this request
    #[serde(default)]
    pub trans_model: Option<ModelConfig>,
}

/// Translated document payload
#[derive(Debug, Serialize)]
pub struct DocumentPayload {
    /// Always `translated.md`
    pub file_name: String,
    /// Always `text/markdown`
    pub mime_type: String,
    /// Translated Markdown text
    pub content: String,
}

/// Markdown translation response: every message of the invocation, in order
#[derive(Debug, Serialize)]
pub struct MarkdownTranslateResponse {
    /// Progress and failure texts
    pub messages: Vec<String>,
    /// The translated document, absent on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentPayload>,
}

/// Health check handler
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: "mdtrans".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Markdown translation handler
async fn translate_markdown(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MarkdownTranslateRequest>,
) -> axum::Json<MarkdownTranslateResponse> {
    let md_file = payload.content.map(|content| {
        let file = UploadedFile::new(content.into_bytes());
        match payload.file_name {
            Some(name) => file.with_file_name(name),
            None => file,
        }
    });
    let params = ToolParameters {
        md_file,
        query: payload.query,
        trans_model: payload.trans_model,
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.processor.invoke(params, &tx).await;
    drop(tx);

    let mut response = MarkdownTranslateResponse {
        messages: Vec::new(),
        document: None,
    };
    while let Some(message) = rx.recv().await {
        match message {
            ToolMessage::Text(text) => response.messages.push(text),
            ToolMessage::Blob(doc) => {
                response.document = Some(DocumentPayload {
                    file_name: doc.file_name,
                    mime_type: doc.mime_type,
                    content: String::from_utf8_lossy(&doc.data).into_owned(),
                });
            }
        }
    }

    axum::Json(response)
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/v1/markdown/translate", post(translate_markdown))
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16) -> anyhow::Result<()> {
    let processor = MarkdownProcessor::from_env()?;
    let app = router(AppState::new(processor));

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::EchoTranslator;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(MarkdownProcessor::new(Arc::new(EchoTranslator))))
    }

    #[tokio::test]
    async fn test_translate_markdown_returns_document() {
        let request = MarkdownTranslateRequest {
            content: Some("Hello\n[home](/)".to_string()),
            file_name: Some("readme.md".to_string()),
            query: String::new(),
            trans_model: None,
        };

        let axum::Json(response) = translate_markdown(State(state()), Json(request)).await;

        let document = response.document.unwrap();
        assert_eq!(document.content, "Hello\n[home](/)");
        assert_eq!(document.file_name, "translated.md");
        assert_eq!(document.mime_type, "text/markdown");
        assert_eq!(response.messages.first().map(String::as_str), Some("File read successfully"));
    }

    #[tokio::test]
    async fn test_translate_markdown_without_content() {
        let request: MarkdownTranslateRequest = serde_json::from_str("{}").unwrap();

        let axum::Json(response) = translate_markdown(State(state()), Json(request)).await;

        assert!(response.document.is_none());
        assert_eq!(response.messages.len(), 1);
        assert!(response.messages[0].contains("Please upload a Markdown file"));
    }

    #[tokio::test]
    async fn test_translate_markdown_accepts_model_override() {
        let request: MarkdownTranslateRequest = serde_json::from_str(
            r#"{"content":"Hi","trans_model":{"provider":"deepseek","model":"deepseek-chat","mode":"completion","completion_params":{"temperature":0.2}}}"#,
        )
        .unwrap();
        let model = request.trans_model.clone().unwrap();
        assert_eq!(model.model, "deepseek-chat");
        assert_eq!(model.completion_params["temperature"], 0.2);

        let axum::Json(response) = translate_markdown(State(state()), Json(request)).await;
        assert_eq!(response.document.unwrap().content, "Hi");
    }

    #[tokio::test]
    async fn test_health_check() {
        let axum::Json(health) = health_check().await;
        assert_eq!(health.status, "ok");
    }
}
