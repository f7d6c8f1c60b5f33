use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use cartshare::{
    auth::Authenticator,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    services::ServiceContext,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging);

    let db_cfg = cfg
        .database
        .as_ref()
        .context("database config is required (APP_DATABASE__URL)")?;
    let auth_cfg = cfg
        .auth
        .as_ref()
        .context("auth config is required (APP_AUTH__JWT_SECRET, APP_AUTH__ADMIN_EMAIL, APP_AUTH__ADMIN_PASSWORD)")?;

    let db = connection::connect(db_cfg).await?;
    let services = ServiceContext::new(&db);
    let auth = Authenticator::bootstrap(auth_cfg, &services).await?;
    tracing::info!(
        strategy = cfg.sharing.strategy.as_str(),
        uploads = %cfg.uploads.dir.display(),
        "sharing and upload settings"
    );

    let state = AppState::new(cfg, db, auth);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(router(state.clone()))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
