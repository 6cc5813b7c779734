use chrono::{DateTime, Utc};
use rand::Rng;

use crate::adapters::sinks::{EventStream, OrderTable, RawEventStore};
use crate::config::{GeneratorConfig, PROGRESS_INTERVAL};
use crate::error::{GeneratorError, Result};
use crate::order::{make_event, make_order, raw_event_key};

pub struct GeneratorSinks<'a> {
    pub table: &'a dyn OrderTable,
    pub stream: &'a dyn EventStream,
    pub raw_events: &'a dyn RawEventStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorReport {
    pub orders_written: usize,
    pub order_ids: Vec<String>,
}

fn sink_error(stage: &'static str, order_id: &str, message: String) -> GeneratorError {
    GeneratorError::Sink {
        stage,
        order_id: order_id.to_string(),
        message,
    }
}

/// Writes `config.count` orders: table item, stream record partitioned by
/// order id, then the raw event object. Stops at the first sink failure.
pub fn run_generator(
    config: &GeneratorConfig,
    sinks: &GeneratorSinks<'_>,
    rng: &mut impl Rng,
    clock: impl Fn() -> DateTime<Utc>,
) -> Result<GeneratorReport> {
    config.validate()?;
    tracing::info!(
        count = config.count,
        table = %config.table,
        stream = %config.stream,
        bucket = %config.bucket,
        "generating orders"
    );

    let mut order_ids = Vec::with_capacity(config.count);
    for index in 0..config.count {
        let order = make_order(rng, clock());
        let order_id = order.order_id.clone();

        sinks
            .table
            .put_order(&order)
            .map_err(|message| sink_error("write order", &order_id, message))?;

        let event = make_event(rng, clock(), order);
        let payload = serde_json::to_vec(&event)?;
        sinks
            .stream
            .put_event(&order_id, &payload)
            .map_err(|message| sink_error("publish event", &order_id, message))?;

        sinks
            .raw_events
            .write_object(&raw_event_key(&order_id), &payload)
            .map_err(|message| sink_error("store raw event", &order_id, message))?;

        order_ids.push(order_id);
        let written = index + 1;
        if written % PROGRESS_INTERVAL == 0 {
            tracing::info!(written, total = config.count, "orders generated");
        }
        if !config.sleep.is_zero() {
            std::thread::sleep(config.sleep);
        }
    }

    Ok(GeneratorReport {
        orders_written: order_ids.len(),
        order_ids,
    })
}
