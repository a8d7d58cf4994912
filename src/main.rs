//! Application entry-point: configuration, storage selection, and server
//! startup.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tastebook::inbound::http::health::HealthState;
use tastebook::inbound::http::identity::TokenCodec;
use tastebook::inbound::http::state::{HttpState, UploadConfig};
use tastebook::outbound::persistence::{MemoryStore, MongoStore};
use tastebook::server::{create_server, ensure_admin_user, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let config = ServerConfig::from_env()?;
    std::fs::create_dir_all(&config.uploads_dir)?;

    let http_state = match &config.mongodb_uri {
        Some(uri) => {
            let store = MongoStore::connect(uri, &config.mongodb_database)
                .await
                .map_err(std::io::Error::other)?;
            info!(database = %config.mongodb_database, "using MongoDB storage");
            build_state(&config, store)
        }
        None => {
            warn!("MONGODB_URI unset; using in-memory storage, data will not survive restarts");
            build_state(&config, MemoryStore::default())
        }
    };

    if let Some(bootstrap) = &config.admin {
        ensure_admin_user(&http_state.users, bootstrap)
            .await
            .map_err(|error| std::io::Error::other(error.to_string()))?;
    }

    let http_state = web::Data::new(http_state);
    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr, "starting server");
    let result = create_server(&config.bind_addr, http_state, health_state.clone())?.await;

    // The listener has stopped; fail liveness probes for any straggler
    // checks while the process winds down.
    health_state.mark_unhealthy();
    info!("server stopped");
    result
}

fn build_state<S>(config: &ServerConfig, store: S) -> HttpState
where
    S: Clone
        + tastebook::domain::ports::UsersRepository
        + tastebook::domain::ports::CategoriesRepository
        + tastebook::domain::ports::RecipesRepository
        + tastebook::domain::ports::ReviewsRepository
        + 'static,
{
    HttpState {
        users: Arc::new(store.clone()),
        categories: Arc::new(store.clone()),
        recipes: Arc::new(store.clone()),
        reviews: Arc::new(store),
        tokens: TokenCodec::new(&config.token_secret, config.token_ttl_hours),
        uploads: UploadConfig::new(&config.uploads_dir),
    }
}
