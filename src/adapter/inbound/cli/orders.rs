//! Handler for the `orders` command.

use std::cmp::Ordering;

use serde_json::json;
use tabled::{Table, Tabled};
use tokio_util::sync::CancellationToken;

use crate::adapter::inbound::cli::command::OrdersArgs;
use crate::adapter::inbound::cli::output;
use crate::application::{Freshness, IngestionOrchestrator};
use crate::domain::{MarketOrder, OrderId, OrderSide, TypeId};
use crate::error::Result;
use crate::port::OrderStore;

#[derive(Tabled)]
struct OrderLine {
    #[tabled(rename = "Order")]
    order_id: OrderId,
    #[tabled(rename = "Type")]
    type_id: TypeId,
    #[tabled(rename = "Side")]
    side: OrderSide,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Issued")]
    issued: String,
}

impl From<&MarketOrder> for OrderLine {
    fn from(order: &MarketOrder) -> Self {
        Self {
            order_id: order.order_id,
            type_id: order.type_id,
            side: order.side,
            price: order.price.round_dp(2).to_string(),
            volume: format!("{}/{}", order.volume_remain, order.volume_total),
            location: order.location_id.to_string(),
            issued: order.issued.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Group by type, sells before buys, best price first on each side.
pub(crate) fn sort_for_display(orders: &mut [MarketOrder]) {
    orders.sort_by(|a, b| {
        a.type_id
            .cmp(&b.type_id)
            .then_with(|| a.is_buy().cmp(&b.is_buy()))
            .then_with(|| {
                if a.is_buy() {
                    b.price.cmp(&a.price)
                } else {
                    a.price.cmp(&b.price)
                }
            })
            .then_with(|| a.order_id.cmp(&b.order_id))
    });
}

async fn load<S: OrderStore>(
    orchestrator: &IngestionOrchestrator<S>,
    args: &OrdersArgs,
    freshness: Freshness,
    cancel: &CancellationToken,
) -> Result<Vec<MarketOrder>> {
    if let (Some(type_id), Freshness::Cached) = (args.type_id, freshness) {
        return orchestrator.get_orders_for_type(args.region, type_id).await;
    }
    let orders = orchestrator.fetch(args.region, freshness, cancel).await?;
    Ok(match args.type_id {
        Some(type_id) => orders.into_iter().filter(|o| o.type_id == type_id).collect(),
        None => orders,
    })
}

/// Execute the orders command.
pub async fn execute<S: OrderStore>(
    orchestrator: &IngestionOrchestrator<S>,
    args: &OrdersArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let freshness = Freshness::from_flags(args.refresh, args.allow_stale);
    let pb = freshness
        .hits_remote()
        .then(|| output::spinner(&format!("Refreshing region {}", args.region)));

    let mut orders = match load(orchestrator, args, freshness, cancel).await {
        Ok(orders) => {
            if let Some(pb) = &pb {
                output::spinner_success(pb, &format!("Region {} loaded", args.region));
            }
            orders
        }
        Err(err) => {
            if let Some(pb) = &pb {
                output::spinner_fail(pb, &format!("Region {} failed", args.region));
            }
            return Err(err);
        }
    };
    sort_for_display(&mut orders);
    let shown = orders.len().min(args.limit);

    if output::is_json() {
        output::json_output(json!({
            "command": "orders",
            "region": args.region,
            "type_id": args.type_id,
            "total": orders.len(),
            "shown": shown,
            "orders": &orders[..shown],
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section(&format!("Region {}", output::highlight(args.region)));
    if orders.is_empty() {
        output::warning("No orders stored for this region");
        output::hint(&format!("run `marketsync refresh {}`", args.region));
        return Ok(());
    }

    let buys = orders.iter().filter(|o| o.is_buy()).count();
    output::field("Orders", orders.len());
    output::field("Buy / sell", format!("{buys} / {}", orders.len() - buys));

    let lines: Vec<OrderLine> = orders[..shown].iter().map(OrderLine::from).collect();
    output::lines(&Table::new(lines).to_string());
    if shown < orders.len() {
        output::note(&format!("{} more not shown (use --limit)", orders.len() - shown));
    }
    Ok(())
}
