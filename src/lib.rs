#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde;

use rocket::{Build, Rocket};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::error::{BackendError, ConfigurationError};
use crate::security::Security;
use crate::store::FileStore;

pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod lifecycle;
pub mod resp;
pub mod role;
pub mod route;
pub mod security;
pub mod setup;
pub mod store;
pub mod util;

/// Assemble a Rocket instance over already-initialized collaborators. Tests
/// use this directly with a temporary store.
pub fn build_rocket(security: Security, store: FileStore) -> Rocket<Build> {
    let r = rocket::build().manage(security).manage(store);
    route::mount_api(r)
}

pub fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Loading security material...");
    let security = Security::load();

    tracing::info!("Opening record store in: {}", c.data_dir.display());
    let store = FileStore::new(c.data_dir.clone())?;

    if c.seed_demo_data {
        setup::initialize_defaults(&store, &security.salt)?;
    } else {
        setup::sync_id_counters(&store)?;
    }

    tracing::info!("Starting HTTP server...");
    let r = build_rocket(security, store).manage(c);

    Ok(r)
}
