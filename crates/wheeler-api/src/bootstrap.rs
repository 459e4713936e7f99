//! # Startup Wiring
//!
//! Turns [`Settings`] into a ready [`AppState`]:
//!
//! 1. **Token verifier** from the JWT secret.
//! 2. **Blob store**: local directory (created here) or Google Drive.
//! 3. **Payment gateway**: Braintree when both keys are present, otherwise
//!    none and the payment routes answer 503.
//! 4. **Database**: optional pool, migrations, then hydration of the
//!    in-memory stores.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use wheeler_media::{BlobStore, DriveBlobStore, DriveConfig, LocalBlobStore};
use wheeler_payments::{BraintreeConfig, BraintreeEnvironment, BraintreeGateway, PaymentGateway};

use crate::auth::{SecretToken, TokenVerifier};
use crate::config::{BlobBackend, Settings};
use crate::state::AppState;

pub async fn bootstrap(settings: &Settings) -> anyhow::Result<AppState> {
    let tokens = TokenVerifier::new(&SecretToken::new(settings.jwt_secret.clone()))
        .context("invalid JWT secret")?;

    let blobs = blob_store(settings).await?;
    tracing::info!(backend = blobs.backend(), "blob store configured");

    let mut state = AppState::new(tokens, blobs).with_config(settings.app_config());

    match payment_gateway(settings)? {
        Some(gateway) => {
            tracing::info!(
                gateway = gateway.name(),
                environment = %settings.braintree_environment,
                "payment gateway configured"
            );
            state = state.with_payments(gateway);
        }
        None => tracing::warn!(
            "BRAINTREE_PUBLIC_KEY / BRAINTREE_PRIVATE_KEY not set. Payment endpoints will return 503."
        ),
    }

    if let Some(pool) = crate::db::init_pool(settings.database_url.as_deref())
        .await
        .context("database initialization failed")?
    {
        state = state.with_db_pool(pool);
    }
    state
        .hydrate_from_db()
        .await
        .context("database hydration failed")?;

    Ok(state)
}

async fn blob_store(settings: &Settings) -> anyhow::Result<Arc<dyn BlobStore>> {
    match settings.blob_backend {
        BlobBackend::Local => {
            let store = LocalBlobStore::new(&settings.storage_root);
            store
                .init()
                .await
                .context("failed to prepare local storage")?;
            Ok(Arc::new(store))
        }
        BlobBackend::Drive => {
            let token = settings
                .drive_access_token
                .clone()
                .context("DRIVE_ACCESS_TOKEN is required when BLOB_BACKEND=drive")?;
            let store = DriveBlobStore::new(DriveConfig::new(token, settings.drive_folder_id.clone()))
                .context("failed to build Drive client")?;
            Ok(Arc::new(store))
        }
    }
}

fn payment_gateway(settings: &Settings) -> anyhow::Result<Option<Arc<dyn PaymentGateway>>> {
    let (Some(public_key), Some(private_key)) = (
        settings.braintree_public_key.as_deref(),
        settings.braintree_private_key.as_deref(),
    ) else {
        return Ok(None);
    };

    let environment = BraintreeEnvironment::from_str(&settings.braintree_environment)
        .context("invalid BRAINTREE_ENVIRONMENT")?;
    let gateway = BraintreeGateway::new(BraintreeConfig::new(environment, public_key, private_key))
        .context("failed to build Braintree client")?;
    Ok(Some(Arc::new(gateway)))
}
