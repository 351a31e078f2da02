//! Handler for the `refresh` command.

use std::time::Instant;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::adapter::inbound::cli::command::RefreshArgs;
use crate::adapter::inbound::cli::output;
use crate::application::IngestionOrchestrator;
use crate::error::{Error, Result};
use crate::port::OrderStore;

/// Execute the refresh command.
///
/// Regions are refreshed one after another through the same orchestrator,
/// so they share its rate limiter. A failed region does not stop the rest;
/// cancellation does. The first error is returned after the loop.
pub async fn execute<S: OrderStore>(
    orchestrator: &IngestionOrchestrator<S>,
    args: &RefreshArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    output::header(env!("CARGO_PKG_VERSION"));

    let mut first_error: Option<Error> = None;
    let mut report = Vec::with_capacity(args.regions.len());

    for &region in &args.regions {
        if cancel.is_cancelled() {
            output::warning("Cancelled, skipping remaining regions");
            break;
        }
        let started = Instant::now();
        let pb = output::spinner(&format!("Refreshing region {region}"));

        match orchestrator.refresh_orders(region, cancel).await {
            Ok(orders) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                output::spinner_success(
                    &pb,
                    &format!("Region {region}: {} orders in {elapsed_ms}ms", orders.len()),
                );
                report.push(json!({
                    "region": region,
                    "status": "ok",
                    "orders": orders.len(),
                    "elapsed_ms": elapsed_ms,
                }));
            }
            Err(err) => {
                output::spinner_fail(&pb, &format!("Region {region}: {err}"));
                report.push(json!({
                    "region": region,
                    "status": "failed",
                    "error": err.to_string(),
                }));
                let cancelled = matches!(&err, Error::Fetch(fetch) if fetch.is_cancellation());
                first_error.get_or_insert(err);
                if cancelled {
                    break;
                }
            }
        }
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "refresh",
            "regions": report,
        }));
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
