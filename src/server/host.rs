//! Server host holding the dashboard state
//!
//! The host is the single source of truth shared by every handler and by the
//! session middleware. It is transport-agnostic; [`RestExposure`] turns it
//! into an axum `Router`.
//!
//! [`RestExposure`]: crate::server::exposure::RestExposure

use crate::config::DashboardConfig;
use crate::core::actions::ActionContext;
use crate::core::auth::{IdentityProvider, SessionStore};
use crate::core::revalidation::ViewCache;
use crate::core::service::{CustomerDirectory, InvoiceStore};
use std::sync::Arc;

/// Host context containing all dashboard state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::new(config, store.clone(), store, identity);
///
/// let host_arc = Arc::new(host);
/// let app = RestExposure::build_router(host_arc, vec![])?;
/// ```
pub struct ServerHost {
    pub config: Arc<DashboardConfig>,

    /// Invoice persistence used by the actions and list views
    pub store: Arc<dyn InvoiceStore>,

    /// Customers offered on the create and edit forms
    pub customers: Arc<dyn CustomerDirectory>,

    pub identity: Arc<dyn IdentityProvider>,

    pub sessions: SessionStore,

    /// Cached invoice list payloads, evicted by the actions
    pub view_cache: ViewCache,
}

impl ServerHost {
    pub fn new(
        config: DashboardConfig,
        store: Arc<dyn InvoiceStore>,
        customers: Arc<dyn CustomerDirectory>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let view_cache = ViewCache::with_capacity(config.cache.capacity);

        Self {
            config: Arc::new(config),
            store,
            customers,
            identity,
            sessions: SessionStore::new(),
            view_cache,
        }
    }

    /// Collaborators for one action run
    pub fn action_context(&self) -> ActionContext {
        ActionContext::new(self.store.clone(), Arc::new(self.view_cache.clone()))
    }

    pub fn items_per_page(&self) -> usize {
        self.config.pagination.items_per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::revalidation::Revalidator;
    use crate::storage::{InMemoryStore, StaticIdentityProvider};
    use serde_json::json;

    fn make_host() -> ServerHost {
        let store = InMemoryStore::new();
        ServerHost::new(
            DashboardConfig::default(),
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(StaticIdentityProvider::new()),
        )
    }

    #[test]
    fn test_items_per_page_from_config() {
        assert_eq!(make_host().items_per_page(), 6);
    }

    #[test]
    fn test_view_cache_capacity_from_config() {
        assert_eq!(make_host().view_cache.capacity(), 256);
    }

    #[test]
    fn test_action_context_revalidates_host_cache() {
        let host = make_host();
        host.view_cache
            .put("/dashboard/invoices?page=1".to_string(), json!([]))
            .unwrap();

        let ctx = host.action_context();
        ctx.revalidator.revalidate_path("/dashboard/invoices").unwrap();

        assert!(host.view_cache.is_empty());
    }
}
