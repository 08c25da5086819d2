//! # Told - Repository proxy demo
//!
//! Wires a repository interface to an in-memory store end to end.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Wiring                                   │
//! │    │                                                            │
//! │    ├── Loads: FactoryConfig (--config, JSON or YAML)            │
//! │    ├── Creates: InMemoryRepositoryBackend (adapter)             │
//! │    ├── Creates: RepositoryFactorySupport (proxy)                │
//! │    ├── Registers: DerivedQueryInterceptor (post-processor)      │
//! │    └── Runs: UserRepository calls through the proxy             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod repositories;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use told_adapter::{simple_crud_repository, InMemoryRepositoryBackend};
use told_proxy::{ProxyFactory, RepositoryFactorySupport};
use told_resolver::RepositoryInformation;
use told_shared::well_known::TRANSACTIONAL_PROXY;
use told_shared::{FactoryConfig, Invoker, TypeRegistry};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::repositories::{audit_repository, user, user_repository, DerivedQueryInterceptor, UserRepositoryImpl};

#[derive(Parser, Debug)]
#[command(name = "told", version, about = "Repository proxy demo")]
struct Cli {
    /// Factory configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("🗂️  Told - Repository proxies");
    info!("");

    let config = match &cli.config {
        Some(path) => FactoryConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => FactoryConfig::default(),
    };

    // ========================================
    // Wiring
    // ========================================

    let user = user();
    let user_repository = user_repository(&user);

    let mut registry = TypeRegistry::with_well_known();
    registry.register(simple_crud_repository());
    registry.register(user.clone());
    registry.register(user_repository.clone());

    let mut factory = RepositoryFactorySupport::with_config(InMemoryRepositoryBackend::new(), &config, &registry)?;

    let store = factory.backend().store(user.name());
    let queries = Arc::new(DerivedQueryInterceptor::new(store.clone()));
    factory.add_repository_proxy_post_processor(Arc::new(
        move |proxy_factory: &mut ProxyFactory, _: &RepositoryInformation| {
            proxy_factory.add_interceptor(queries.clone());
        },
    ));

    // ========================================
    // Create the repository
    // ========================================

    info!("📋 Creating {}...", user_repository.name());

    let custom = UserRepositoryImpl::new(&user, store);
    let repository = factory.get_repository(&user_repository, Some(Arc::new(custom)))?;

    info!("   ✓ Proxy {} ready", repository.id());
    info!("   Interceptors: {}", repository.interceptor_names().join(" → "));
    info!("   Transactional: {}", repository.implements(TRANSACTIONAL_PROXY));
    info!("");

    // ========================================
    // Use it
    // ========================================

    info!("💾 Saving users...");
    for entity in [
        json!({ "id": 1, "name": "alice", "active": true }),
        json!({ "id": 2, "name": "bob", "active": false }),
        json!({ "id": 3, "name": "carol", "active": true }),
    ] {
        let saved = repository.call("save", vec![entity])?;
        info!("   ✓ {}", saved);
    }
    info!("");

    info!("🔎 Querying...");
    info!("   count()          = {}", repository.call("count", vec![])?);
    info!("   findById(2)      = {}", repository.call("findById", vec![json!(2)])?);
    info!("   findActive()     = {}", repository.call("findActive", vec![])?);
    info!("   findByName(bob)  = {}", repository.call("findByName", vec![json!("bob")])?);
    info!("   countActive()    = {}", repository.call("countActive", vec![])?);
    info!("");

    // ========================================
    // A repository that cannot be built
    // ========================================

    info!("🚫 Creating AuditRepository without a custom implementation...");
    match factory.get_repository(&audit_repository(&user), None) {
        Ok(_) => warn!("   ✗ Unexpectedly created"),
        Err(e) => info!("   ✓ Rejected: {}", e),
    }

    info!("");
    info!("📊 Cached repository information: {}", factory.cached_information_count());
    info!("🗂️  Told demo complete!");
    Ok(())
}
