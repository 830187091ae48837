//! Application state.

use std::sync::Arc;

use pixelmint_store::RocksStore;

use crate::config::ServiceConfig;
use crate::generation::GenerationClient;
use crate::identity::IdentityClient;
use crate::payments::PaymentClient;

/// Application state shared across handlers.
///
/// Provider clients hold only service-level credentials and a pooled HTTP
/// client; no per-user session state lives here.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Payment provider client (optional).
    pub payments: Option<Arc<PaymentClient>>,

    /// Image-generation provider client (optional).
    pub generation: Option<Arc<GenerationClient>>,

    /// Identity provider client for the session bridge (optional).
    pub identity: Option<Arc<IdentityClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let payments = config.payment_api_key.as_ref().map(|key| {
            tracing::info!("Payment provider integration enabled");
            let client = match &config.payment_api_url {
                Some(url) => PaymentClient::with_base_url(
                    key,
                    config.payment_webhook_secret.clone(),
                    url,
                ),
                None => PaymentClient::new(key, config.payment_webhook_secret.clone()),
            };
            Arc::new(client)
        });

        if payments.is_none() {
            tracing::warn!("Payment provider not configured - checkout will not be available");
        }

        let generation = config
            .generation_api_url
            .as_ref()
            .zip(config.generation_api_token.as_ref())
            .map(|(url, token)| {
                tracing::info!(generation_url = %url, "Generation provider integration enabled");
                Arc::new(GenerationClient::new(url, token))
            });

        if generation.is_none() {
            tracing::warn!("Generation provider not configured - generation will not be available");
        }

        let identity = Some(Arc::new(IdentityClient::new(&config.auth_issuer_url)));

        Self {
            store,
            config,
            payments,
            generation,
            identity,
        }
    }
}
