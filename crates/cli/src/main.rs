//! `storefront`: run a scripted shopping session, streaming data-layer pushes to
//! stdout as JSON lines.
//!
//! ```text
//! storefront [SCRIPT]
//! ```
//!
//! Environment: `STOREFRONT_DATA_DIR` (persistent store directory, default
//! `.storefront`), `STOREFRONT_CATALOG` (JSON catalog replacing the bundled one),
//! plus the `STOREFRONT_*` settings read by `StorefrontConfig::from_env`.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use storefront_analytics::{AnalyticsEnvelope, InMemoryDataLayer};
use storefront_catalog::Catalog;
use storefront_cli::{DEMO_SCRIPT, execute, parse_script};
use storefront_events::{EventBus, InMemoryEventBus, Subscription};
use storefront_session::{
    InMemoryKeyValueStore, JsonFileStore, SessionError, Storefront, StorefrontConfig,
};

fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = StorefrontConfig::from_env();

    let catalog = match std::env::var("STOREFRONT_CATALOG") {
        Ok(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read catalog {path}"))?;
            Catalog::from_json(&source).with_context(|| format!("invalid catalog {path}"))?
        }
        Err(_) => Catalog::bundled().context("bundled catalog is invalid")?,
    };

    let data_dir =
        std::env::var("STOREFRONT_DATA_DIR").unwrap_or_else(|_| ".storefront".to_string());
    let persistent = JsonFileStore::open(&data_dir)
        .with_context(|| format!("failed to open data directory {data_dir}"))?;

    let script = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read script {path}"))?,
        None => DEMO_SCRIPT.to_string(),
    };
    let steps = parse_script(&script).context("invalid session script")?;

    let bus: Arc<InMemoryEventBus<AnalyticsEnvelope>> = Arc::new(InMemoryEventBus::new());
    let pushes = bus.subscribe();
    let mut store = Storefront::load(
        config,
        Arc::new(catalog),
        persistent,
        InMemoryKeyValueStore::new(),
        InMemoryDataLayer::with_bus(bus),
    )
    .context("failed to load session")?;

    let mut out = std::io::stdout().lock();
    for step in &steps {
        match execute(&mut store, step) {
            Ok(navigation) => {
                tracing::info!(step = ?step, navigation = ?navigation, "step");
            }
            // Form errors are shown to the shopper; the session carries on.
            Err(SessionError::Domain(err)) => {
                tracing::warn!(step = ?step, error = %err, "step rejected");
            }
            Err(err) => return Err(err).with_context(|| format!("step failed: {step:?}")),
        }
        forward(&pushes, &mut out)?;
    }

    out.flush().context("failed to flush stdout")?;
    Ok(())
}

/// Write every queued data-layer push as one JSON line.
fn forward(pushes: &Subscription<AnalyticsEnvelope>, out: &mut impl Write) -> anyhow::Result<()> {
    for envelope in pushes.drain() {
        serde_json::to_writer(&mut *out, &envelope).context("failed to encode data layer push")?;
        writeln!(out).context("failed to write data layer push")?;
    }
    Ok(())
}
