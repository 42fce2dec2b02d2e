//! Engine construction around a [`TableAdapter`].
//!
//! A host builds the model from its definition file, hands the adapter to a
//! fresh enforcer (which performs the initial load) and keeps the result. A
//! failure is kept as a sticky error rather than a panic, so processes that
//! wire the host eagerly can check it later.

use crate::adapter::TableAdapter;
use crate::connection::config::AdapterConfig;
use crate::core::{AdapterError, Result};
use crate::storage::RuleStore;
use casbin::{CoreApi, DefaultModel, Enforcer};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Enforcer behind the lock that serializes adapter access.
pub type SharedEnforcer = Arc<RwLock<Enforcer>>;

pub struct PolicyHost {
    state: std::result::Result<SharedEnforcer, AdapterError>,
}

impl PolicyHost {
    /// Build an adapter over `store`, then the enforcer.
    pub async fn open<S, P>(model_path: P, store: S, config: AdapterConfig) -> Self
    where
        S: RuleStore + 'static,
        P: AsRef<Path>,
    {
        match TableAdapter::new(store, config).await {
            Ok(adapter) => Self::with_adapter(model_path, adapter).await,
            Err(err) => Self::failed(err),
        }
    }

    /// Build the enforcer over an already constructed adapter.
    pub async fn with_adapter<S, P>(model_path: P, adapter: TableAdapter<S>) -> Self
    where
        S: RuleStore + 'static,
        P: AsRef<Path>,
    {
        match build_enforcer(model_path.as_ref(), adapter).await {
            Ok(enforcer) => {
                info!(model = %model_path.as_ref().display(), "policy host ready");
                Self {
                    state: Ok(Arc::new(RwLock::new(enforcer))),
                }
            }
            Err(err) => Self::failed(err),
        }
    }

    fn failed(err: AdapterError) -> Self {
        warn!(error = %err, "policy host initialization failed");
        Self { state: Err(err) }
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ok()
    }

    /// The initialization failure, if any. It does not clear.
    pub fn error(&self) -> Option<&AdapterError> {
        self.state.as_ref().err()
    }

    pub fn enforcer(&self) -> Result<SharedEnforcer> {
        match &self.state {
            Ok(enforcer) => Ok(Arc::clone(enforcer)),
            Err(err) => Err(AdapterError::InitError(err.to_string())),
        }
    }
}

async fn build_enforcer<S>(model_path: &Path, adapter: TableAdapter<S>) -> Result<Enforcer>
where
    S: RuleStore + 'static,
{
    let model = DefaultModel::from_file(model_path).await?;
    let enforcer = Enforcer::new(model, adapter).await?;
    Ok(enforcer)
}
