use std::sync::Arc;

use sxw_api::HttpClubApi;

use sxw_core::{
    config::Config,
    identity::{IdentityStore, JsonFileStore, MemoryStore},
    storefront::{Storefront, StorefrontOptions},
};

#[tokio::main]
async fn main() -> Result<(), sxw_core::Error> {
    sxw_core::logging::init("sxw")?;

    let cfg = Arc::new(Config::load()?);

    let api = Arc::new(HttpClubApi::from_config(&cfg)?);
    let store: Arc<dyn IdentityStore> = match &cfg.identity_store_path {
        Some(path) => Arc::new(JsonFileStore::new(path.clone())),
        None => Arc::new(MemoryStore::default()),
    };
    tracing::info!(
        default_id = %cfg.default_telegram_id,
        store = ?cfg.identity_store_path,
        "storefront configured"
    );

    let storefront = Arc::new(Storefront::new(
        api,
        store,
        StorefrontOptions::from_config(&cfg),
    ));

    sxw_telegram::router::run_polling(cfg, storefront)
        .await
        .map_err(|e| sxw_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
