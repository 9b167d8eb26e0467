use mtb_core::{Badge, CatalogError, parse_catalog, resolve_catalog_path};
use mtb_tracking::TrackingConfig;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Reads a catalog from an `http(s)` URL or a local file.
pub async fn fetch_catalog(location: &str) -> Result<Vec<Badge>, FetchError> {
    let body = if location.starts_with("http://") || location.starts_with("https://") {
        reqwest::get(location)
            .await?
            .error_for_status()?
            .text()
            .await?
    } else {
        tokio::fs::read_to_string(location).await?
    };
    Ok(parse_catalog(&body)?)
}

/// Loads the configured catalog. Never fails: any problem yields an empty
/// badge list so tracking and saving carry on.
pub async fn load_catalog(config: TrackingConfig) -> Vec<Badge> {
    let Some(path) = config.catalog_path.as_deref() else {
        warn!("no badge catalog configured");
        return Vec::new();
    };
    let resolved = resolve_catalog_path(path, &config.catalog_prefix);
    info!(%resolved, "fetching badge catalog");

    match fetch_catalog(&resolved).await {
        Ok(badges) => badges,
        Err(err) => {
            warn!(%err, %resolved, "badge catalog unavailable, continuing without badges");
            Vec::new()
        }
    }
}
