//! Process-scoped cache for the remote inference client.
//!
//! The client is built on first use and shared by every later invocation
//! in the same process. A failed build leaves the cache empty, so the next
//! invocation tries again.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::inference::ModelClient;
use crate::inference::bedrock::BedrockClient;

type Factory<C> = Box<dyn Fn() -> Result<C> + Send + Sync>;

pub struct ClientCache<C> {
    cell: OnceCell<Arc<C>>,
    factory: Factory<C>,
}

impl<C: ModelClient> ClientCache<C> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<C> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// The shared client, constructing it if this is the first successful call.
    pub async fn get_client(&self) -> Result<Arc<C>> {
        let client = self
            .cell
            .get_or_try_init(|| async {
                match (self.factory)() {
                    Ok(client) => {
                        info!("inference client ready");
                        Ok(Arc::new(client))
                    }
                    Err(e) => {
                        error!(error = %e, "critical failure creating inference client");
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(client))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl ClientCache<BedrockClient> {
    /// Cache for the hosted endpoint described by `config`.
    pub fn bedrock(config: Config) -> Self {
        Self::new(move || {
            let client = BedrockClient::new(&config)?;
            info!(region = %config.region, endpoint = %config.endpoint_url(), "connected inference client");
            Ok(client)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::inference::mock::MockModelClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn constructs_once_and_reuses() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let cache = ClientCache::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(MockModelClient::default())
        });

        assert!(!cache.is_initialized());
        let first = cache.get_client().await.unwrap();
        let second = cache.get_client().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(cache.is_initialized());
    }

    #[tokio::test]
    async fn failed_construction_is_not_cached() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let cache = ClientCache::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::ClientConstruction("network down".to_string()))
            } else {
                Ok(MockModelClient::default())
            }
        });

        let err = cache.get_client().await.err().unwrap();
        assert_eq!(err.kind(), "ClientConstructionError");
        assert!(!cache.is_initialized());

        assert!(cache.get_client().await.is_ok());
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bedrock_cache_without_credentials_fails_each_time() {
        let cache = ClientCache::bedrock(Config::default());
        assert!(cache.get_client().await.is_err());
        assert!(cache.get_client().await.is_err());
        assert!(!cache.is_initialized());
    }
}
