//! Invoice dashboard server
//!
//! Configuration is read from the YAML file named by `DASHBOARD_CONFIG`
//! (optional), then overridden by `DASHBOARD_BIND`, `DATABASE_URL` and
//! `DASHBOARD_ITEMS_PER_PAGE`. Log filtering follows `RUST_LOG`.

use invoices::prelude::*;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => DashboardConfig::from_yaml_file(&path)?,
        Err(_) => DashboardConfig::default(),
    }
    .apply_env_overrides()?;

    let addr = config.bind_addr()?.to_string();
    let builder = ServerBuilder::new();

    let builder = match config.database.url.clone() {
        Some(url) => with_database(builder, &config, &url).await?,
        None => {
            tracing::info!(seed = config.seed_demo_data, "using in-memory store");
            let store = if config.seed_demo_data {
                InMemoryStore::with_demo_data()
            } else {
                InMemoryStore::new()
            };
            builder.with_store(store)
        }
    };

    builder.with_config(config).serve(&addr).await
}

#[cfg(feature = "postgres")]
async fn with_database(
    builder: ServerBuilder,
    config: &DashboardConfig,
    url: &str,
) -> Result<ServerBuilder> {
    use invoices::storage::postgres;

    let store = PostgresStore::connect(url, config.database.max_connections).await?;
    store.ensure_schema().await?;
    if config.seed_demo_data {
        postgres::seed_demo_data(store.pool()).await?;
    }
    tracing::info!("using PostgreSQL store");

    let mut users = config.users.clone();
    for user in postgres::fetch_users(store.pool()).await? {
        if !users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            users.push(user);
        }
    }
    let identity = StaticIdentityProvider::from_seed(&users)?;

    Ok(builder.with_store(store).with_identity_provider(identity))
}

#[cfg(not(feature = "postgres"))]
async fn with_database(
    _builder: ServerBuilder,
    _config: &DashboardConfig,
    _url: &str,
) -> Result<ServerBuilder> {
    anyhow::bail!("DATABASE_URL is set but this binary was built without the `postgres` feature")
}
