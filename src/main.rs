use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use std::sync::Arc;
use summit_match::config::{LoggingSettings, Settings};
use summit_match::routes::{self, AppState};
use summit_match::services::{
    Embedder, Extractor, HashingEmbedder, HttpEmbedder, HttpExtractor, ProfileEnricher,
};
use summit_match::{MatchPipeline, Matcher};
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn build_pipeline(settings: &Settings) -> std::io::Result<MatchPipeline> {
    let embedder: Arc<dyn Embedder> = match &settings.embedding.endpoint {
        Some(endpoint) => {
            let client = HttpEmbedder::new(
                endpoint.clone(),
                settings.embedding.api_key.clone(),
                settings.embedding.model.clone(),
                settings.embedding.dimensions,
                settings.embedding.batch_size,
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            info!("Embedding backend: {} ({})", endpoint, settings.embedding.model);
            Arc::new(client)
        }
        None => {
            info!("Embedding backend: local feature hashing ({} dims)", settings.embedding.dimensions);
            Arc::new(HashingEmbedder::new(settings.embedding.dimensions))
        }
    };

    let extractor: Option<Arc<dyn Extractor>> = match &settings.extraction.endpoint {
        Some(endpoint) => {
            let client = HttpExtractor::new(
                endpoint.clone(),
                settings.extraction.api_key.clone(),
                settings.extraction.model.clone(),
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            info!("Extraction backend: {} ({})", endpoint, settings.extraction.model);
            Some(Arc::new(client))
        }
        None => {
            info!("Extraction backend: none, using deterministic inference");
            None
        }
    };

    let config = settings.scoring.to_scoring_config();
    info!("Matcher initialized with weights: {:?}", config.weights);

    Ok(MatchPipeline::new(
        ProfileEnricher::new(extractor, settings.extraction.cache_capacity),
        embedder,
        settings.embedding.cache_capacity,
        Matcher::new(config),
        settings.matching.top_k,
    ))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(&settings.logging);
    info!("Starting Summit Match service...");
    info!("Configuration loaded successfully");

    for warning in settings.scoring.weight_convention_warnings() {
        warn!("{}", warning);
    }

    let pipeline = build_pipeline(&settings).map_err(|e| {
        error!("Failed to initialize pipeline: {}", e);
        e
    })?;

    // Build application state
    let app_state = AppState {
        pipeline: Arc::new(pipeline),
        max_profiles: settings.matching.max_profiles,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().limit(8 * 1024 * 1024).error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
