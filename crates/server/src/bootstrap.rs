use std::sync::Arc;

use kfzroute_agent::{LlmError, OpenAiClient, RouterRuntime};
use kfzroute_core::config::{AppConfig, ConfigError};
use kfzroute_store::{RestDataStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("data store client could not be built: {0}")]
    Store(#[source] StoreError),
    #[error("language model client could not be built: {0}")]
    LanguageModel(#[source] LlmError),
}

/// Missing store or model settings are reported, not fatal.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    config.validate()?;

    let store = RestDataStore::from_config(&config.store).map_err(BootstrapError::Store)?;
    let llm = OpenAiClient::from_config(&config.llm).map_err(BootstrapError::LanguageModel)?;

    let store_configured = config.store.is_configured();
    let llm_configured = config.llm.is_configured();
    if !store_configured {
        warn!(
            event_name = "system.bootstrap.store_unconfigured",
            correlation_id = "bootstrap",
            "data store url is not set; chat completions will fail"
        );
    }
    if !llm_configured {
        warn!(
            event_name = "system.bootstrap.llm_unconfigured",
            correlation_id = "bootstrap",
            "language model api key is not set"
        );
    }

    let state = AppState {
        runtime: RouterRuntime::new(Arc::new(store), Arc::new(llm)),
        store_configured,
        llm_configured,
    };

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        "router runtime initialized"
    );

    Ok(Application { config, state })
}
