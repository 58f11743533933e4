//! Command-line entry point: open the configured stores, drill down to the
//! requested scope and print what each mounted view lists.
//!
//! ```text
//! procure-client [VENDOR_ID [PRODUCT_ID [PO_NUMBER]]]
//! ```

use anyhow::Context;
use tracing::info;

use procure_core::{PoNumber, ProductId, VendorId};
use procure_entities::{Product, PurchaseOrder, Vendor};
use procure_infra::StoreConfig;
use procure_observability::LogFormat;
use procure_workflow::DeletePolicy;

use procure_client::{Session, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = match std::env::var("PROCURE_LOG_FORMAT") {
        Ok(raw) => raw.parse::<LogFormat>().map_err(anyhow::Error::msg)?,
        Err(_) => LogFormat::default(),
    };
    procure_observability::init_with(format);

    let config = StoreConfig::from_env().context("loading store configuration")?;
    info!(?config, "starting procurement client");

    let stores = Stores::from_config(&config)
        .await
        .context("opening entity stores")?;
    let mut session = Session::start(stores, DeletePolicy::default()).await;

    let mut args = std::env::args().skip(1);
    if let Some(raw) = args.next() {
        let vendor: VendorId = raw.parse().context("vendor id")?;
        session.select::<Vendor>(vendor).await?;
    }
    if let Some(raw) = args.next() {
        let product: ProductId = raw.parse().context("product id")?;
        session.select::<Product>(product).await?;
    }
    if let Some(raw) = args.next() {
        let order: PoNumber = raw.parse().context("purchase order number")?;
        session.select::<PurchaseOrder>(order).await?;
    }

    let snapshot = serde_json::to_string_pretty(&session.snapshot())?;
    println!("{snapshot}");

    session.shutdown();
    Ok(())
}
