//! Single-input, single-output web form served with axum.
//!
//! `GET /` renders the form and, when a `query` parameter is present, the
//! answer below it. `POST /api/query` takes `{"query": "..."}` and returns
//! `{"output": "...", "kind": "text" | "markup"}`.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Static strings shown around the form.
#[derive(Debug, Clone)]
pub struct FormLabels {
    pub title: String,
    pub description: String,
    pub input_label: String,
    pub placeholder: String,
    pub output_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Escaped and shown preformatted.
    Text,
    /// Inserted into the page as-is.
    Markup,
}

/// Answers one query with one rendered blob.
pub trait QueryHandler: Send + Sync + 'static {
    fn labels(&self) -> FormLabels;
    fn output_kind(&self) -> OutputKind;
    fn answer(&self, query: &str) -> String;
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub output: String,
    pub kind: OutputKind,
}

pub struct FormServer<H: QueryHandler> {
    handler: Arc<H>,
}

impl<H: QueryHandler> FormServer<H> {
    pub fn new(handler: H) -> Self {
        FormServer {
            handler: Arc::new(handler),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(page::<H>))
            .route("/api/query", post(api_query::<H>))
            .with_state(self.handler.clone())
    }

    /// Serves the form on `addr` until ctrl-c.
    pub async fn serve(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!(
            "Serving '{}' on http://{}",
            self.handler.labels().title,
            listener.local_addr()?
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Search form stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
    }
}

// Answers run on the blocking pool since embedding a query is CPU-bound
async fn run_handler<H: QueryHandler>(handler: Arc<H>, query: String) -> Result<String, Response> {
    tokio::task::spawn_blocking(move || handler.answer(&query))
        .await
        .map_err(|e| {
            error!("Query handler panicked: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "query handler failed").into_response()
        })
}

async fn page<H: QueryHandler>(
    State(handler): State<Arc<H>>,
    Query(request): Query<QueryRequest>,
) -> Response {
    let query = request.query.unwrap_or_default();
    let output = if query.is_empty() {
        None
    } else {
        match run_handler(handler.clone(), query.clone()).await {
            Ok(output) => Some(output),
            Err(response) => return response,
        }
    };

    Html(render_page(
        &handler.labels(),
        handler.output_kind(),
        &query,
        output.as_deref(),
    ))
    .into_response()
}

async fn api_query<H: QueryHandler>(
    State(handler): State<Arc<H>>,
    Json(request): Json<QueryRequest>,
) -> Response {
    let query = request.query.unwrap_or_default();
    match run_handler(handler.clone(), query).await {
        Ok(output) => Json(QueryResponse {
            output,
            kind: handler.output_kind(),
        })
        .into_response(),
        Err(response) => response,
    }
}

fn render_page(labels: &FormLabels, kind: OutputKind, query: &str, output: Option<&str>) -> String {
    let output_html = match (output, kind) {
        (None, _) => String::new(),
        (Some(text), OutputKind::Text) => format!("<pre>{}</pre>", encode_text(text)),
        (Some(markup), OutputKind::Markup) => markup.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
<p>{description}</p>
<form method="get" action="/">
<label for="query">{input_label}</label>
<input type="text" id="query" name="query" value="{query}" placeholder="{placeholder}">
<button type="submit">Submit</button>
</form>
<h2>{output_label}</h2>
<div id="output">{output_html}</div>
</body>
</html>
"#,
        title = encode_text(&labels.title),
        description = encode_text(&labels.description),
        input_label = encode_text(&labels.input_label),
        query = encode_double_quoted_attribute(query),
        placeholder = encode_double_quoted_attribute(&labels.placeholder),
        output_label = encode_text(&labels.output_label),
        output_html = output_html,
    )
}
