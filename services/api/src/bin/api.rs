//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{HostedApi, HostedAuthAdapter, HostedTaskAdapter, OpenAiChatAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, rest::ApiDoc, state::AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use hogarzen_core::{ChatAssistant, ChatSettings};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const HOSTED_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // Missing credentials degrade the service instead of stopping it.
    let config_issues = config.configuration_issues();
    for issue in &config_issues {
        warn!(variable = %issue.variable, "{}", issue.message);
    }

    // --- 2. Initialize Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(HOSTED_REQUEST_TIMEOUT)
        .build()?;
    let hosted = HostedApi::new(http, config.backend_credentials());
    if !hosted.is_configured() {
        warn!("Hosted backend credentials missing; auth and tasks will answer 503");
    }
    let auth_backend = Arc::new(HostedAuthAdapter::new(hosted.clone()));
    let task_repo = Arc::new(HostedTaskAdapter::new(hosted));

    let chat_model = Arc::new(OpenAiChatAdapter::new(
        config.chat_api_key(),
        &config.gemini_base_url,
        config.chat_model.clone(),
    ));
    let assistant = Arc::new(ChatAssistant::new(
        chat_model,
        ChatSettings {
            timeout: config.chat_timeout,
            ..ChatSettings::default()
        },
    ));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth_backend,
        task_repo,
        assistant,
        config_issues: Arc::new(config_issues),
    });

    let origin = config.app_url.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("APP_URL is not a valid origin: {}", e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(build_router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
