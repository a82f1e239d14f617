use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::DownstreamConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::aggregate::AggregationOrchestrator;
use service::proximity::ProximityResolver;
use service::search::UnifiedSearchCoordinator;
use service::store::http::HttpEntityStore;

use crate::routes;

/// Shared handler state. The downstream endpoints are resolved once here and
/// injected into the services; nothing looks them up afterwards.
#[derive(Clone)]
pub struct ServerState {
    pub resolver: Arc<ProximityResolver<HttpEntityStore>>,
    pub orchestrator: Arc<AggregationOrchestrator<HttpEntityStore, HttpEntityStore>>,
    pub search: Arc<UnifiedSearchCoordinator<HttpEntityStore>>,
}

fn init_logging() {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the composite services against the configured downstreams.
pub fn build_state(downstreams: &DownstreamConfig) -> anyhow::Result<ServerState> {
    let client = reqwest::Client::builder()
        .connect_timeout(downstreams.connect_timeout())
        .timeout(downstreams.request_timeout())
        .build()?;

    let experience_store = Arc::new(HttpEntityStore::new(
        client.clone(),
        downstreams.experience_service_url.as_str(),
    ));
    let review_store =
        Arc::new(HttpEntityStore::new(client, downstreams.review_service_url.as_str()));

    Ok(ServerState {
        resolver: Arc::new(ProximityResolver::new(Arc::clone(&experience_store))),
        orchestrator: Arc::new(
            AggregationOrchestrator::new(Arc::clone(&experience_store), review_store)
                .with_side_timeout(downstreams.side_fetch_timeout()),
        ),
        search: Arc::new(UnifiedSearchCoordinator::new(experience_store)),
    })
}

/// Public entry: build the app and run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_and_validate()?;
    info!(
        experience_service = %cfg.downstreams.experience_service_url,
        review_service = %cfg.downstreams.review_service_url,
        "downstream endpoints resolved"
    );

    let state = build_state(&cfg.downstreams)?;
    let app: Router = routes::build_router(state, build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting experience gateway");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
