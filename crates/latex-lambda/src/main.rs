//! AWS Lambda handler for the LaTeX compiler
//!
//! This Lambda function handles:
//! - POST /compile - Compile a LaTeX document to PDF
//! - GET /health - Health check
//!
//! ## Deployment
//!
//! ```bash
//! # Install cargo-lambda
//! cargo install cargo-lambda
//!
//! # Build for ARM64
//! cargo lambda build --release --arm64
//!
//! # Deploy (the execution image must have a TeX Live install with pdflatex)
//! cargo lambda deploy --iam-role arn:aws:iam::ACCOUNT:role/latex-lambda
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use lambda_http::{http::StatusCode, run, service_fn, Body, Error, Request, Response};
use latex_lambda::{
    compile_and_deliver, CompileRequest, Delivery, LatexLambdaConfig, Pdflatex, PipelineError,
    S3Store,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, instrument, warn};

/// Global S3 store (initialized once)
static S3_STORE: OnceCell<Arc<S3Store>> = OnceCell::const_new();

/// Get or initialize the S3 store
async fn get_store() -> Arc<S3Store> {
    S3_STORE
        .get_or_init(|| async { Arc::new(S3Store::new().await) })
        .await
        .clone()
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing with CloudWatch-optimized settings
    // See: https://docs.aws.amazon.com/lambda/latest/dg/rust-logging.html
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false) // CloudWatch doesn't support ANSI colors
        .with_current_span(false) // Reduce duplicate info in logs
        .without_time() // CloudWatch adds ingestion time
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("latex_lambda=info".parse().unwrap()),
        )
        .init();

    info!(
        version = latex_lambda::VERSION,
        "Starting LaTeX compiler Lambda"
    );

    // Run the Lambda service
    run(service_fn(handler)).await
}

/// Main Lambda handler
#[instrument(skip(event), fields(method = %event.method(), path = %event.uri().path()))]
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();

    let response = match (method.as_str(), path.as_str()) {
        ("POST", "/compile") | ("POST", "/") => handle_compile(event).await,
        ("GET", "/health") => handle_health(),
        ("OPTIONS", _) => handle_cors_preflight(),
        _ => {
            warn!(method = %method, path = %path, "Route not found");
            Ok(json_response(
                StatusCode::NOT_FOUND,
                json!({ "error": "Not found" }),
            ))
        }
    };

    // Add CORS headers to all responses
    response.map(|mut resp| {
        let headers = resp.headers_mut();
        headers.insert("Access-Control-Allow-Origin", "*".parse().unwrap());
        headers.insert(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS".parse().unwrap(),
        );
        headers.insert(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization".parse().unwrap(),
        );
        resp
    })
}

/// Handle POST /compile - Compile a LaTeX document to PDF
async fn handle_compile(event: Request) -> Result<Response<Body>, Error> {
    // Parse request body
    let body = event.body();
    let request: CompileRequest = match serde_json::from_slice(body.as_ref()) {
        Ok(req) => req,
        Err(e) => {
            return Ok(json_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Invalid request: {}", e) }),
            ));
        }
    };

    let config = LatexLambdaConfig::from_env();
    let compiler = Pdflatex::new(&config.pdflatex_bin, &config.scratch_dir);
    let store = get_store().await;

    match compile_and_deliver(&request, &config, &compiler, store.as_ref()).await {
        Ok(Delivery::Uploaded { bucket, key }) => Ok(json_response(
            StatusCode::OK,
            json!({ "message": format!("Successfully compiled and uploaded to s3 bucket {bucket} as {key}") }),
        )),
        // A binary body makes lambda_http set the base64 flag on the
        // API Gateway response
        Ok(Delivery::Inline {
            data_base64,
            filename,
        }) => match BASE64.decode(&data_base64) {
            Ok(bytes) => Ok(pdf_response(bytes, &filename)),
            Err(e) => Ok(json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Unexpected error: {}", e) }),
            )),
        },
        Err(e) => {
            error!(error = %e, "Compile request failed");
            let status = match &e {
                PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
                PipelineError::Compilation { .. }
                | PipelineError::Upload(_)
                | PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Ok(json_response(status, json!({ "error": e.to_string() })))
        }
    }
}

/// Handle GET /health - Health check
fn handle_health() -> Result<Response<Body>, Error> {
    let config = LatexLambdaConfig::from_env();
    let delivery_mode = if config.bucket.is_some() { "s3" } else { "inline" };
    Ok(json_response(
        StatusCode::OK,
        json!({
            "status": "healthy",
            "version": latex_lambda::VERSION,
            "delivery": delivery_mode,
        }),
    ))
}

/// Handle CORS preflight
fn handle_cors_preflight() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(Body::Empty)
        .unwrap())
}

/// Create a JSON response
fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Inline PDF delivery with attachment headers
fn pdf_response(bytes: Vec<u8>, filename: &str) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/pdf")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .unwrap()
}
