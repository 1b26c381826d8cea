//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::DashboardConfig;
use crate::core::auth::IdentityProvider;
use crate::core::service::{CustomerDirectory, InvoiceStore};
use crate::storage::{StaticIdentityProvider, demo};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the dashboard server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(config)
///     .with_store(InMemoryStore::with_demo_data())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: Option<DashboardConfig>,
    store: Option<Arc<dyn InvoiceStore>>,
    customers: Option<Arc<dyn CustomerDirectory>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
            customers: None,
            identity: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the configuration (defaults to [`DashboardConfig::default`])
    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use one backend as both invoice store and customer directory
    pub fn with_store<S>(mut self, store: S) -> Self
    where
        S: InvoiceStore + CustomerDirectory + 'static,
    {
        let store = Arc::new(store);
        self.store = Some(store.clone());
        self.customers = Some(store);
        self
    }

    /// Set the invoice store on its own
    pub fn with_invoice_store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the customer directory on its own
    pub fn with_customer_directory(mut self, customers: Arc<dyn CustomerDirectory>) -> Self {
        self.customers = Some(customers);
        self
    }

    /// Set the identity provider
    ///
    /// Without one, a [`StaticIdentityProvider`] is built from the configured
    /// users, plus the demo account when `seed_demo_data` is set.
    pub fn with_identity_provider(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identity = Some(Arc::new(provider));
        self
    }

    /// Add custom routes to the server
    ///
    /// Custom routes pass through the session middleware like every other
    /// route, so anything under `/dashboard` requires a session.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        let config = self.config.take().unwrap_or_default();

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("InvoiceStore is required. Call .with_store()"))?;

        let customers = self.customers.take().ok_or_else(|| {
            anyhow::anyhow!("CustomerDirectory is required. Call .with_customer_directory()")
        })?;

        let identity = match self.identity.take() {
            Some(identity) => identity,
            None => Arc::new(Self::default_identity(&config)?),
        };

        Ok(ServerHost::new(config, store, customers, identity))
    }

    fn default_identity(config: &DashboardConfig) -> Result<StaticIdentityProvider> {
        let mut users = config.users.clone();
        if config.seed_demo_data && !users.iter().any(|u| u.email == demo::DEMO_USER_EMAIL) {
            users.push(demo::user());
        }

        let provider = StaticIdentityProvider::from_seed(&users)?;
        if provider.is_empty() {
            tracing::warn!("no users configured; every sign-in will be rejected");
        }
        Ok(provider)
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_store(store)
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}


/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
