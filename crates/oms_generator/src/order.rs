//! Order and event records written by the generator.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const CURRENCY: &str = "AUD";
pub const WAREHOUSES: [&str; 3] = ["WH-1", "WH-2", "WH-3"];
pub const RAW_EVENT_PREFIX: &str = "raw/events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    PaymentPending,
    PaymentFailed,
    Allocated,
}

impl OrderStatus {
    pub const ALL: [Self; 4] = [
        Self::Placed,
        Self::PaymentPending,
        Self::PaymentFailed,
        Self::Allocated,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Authorized,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    OrderCreated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: String,
    pub qty: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub status: PaymentStatus,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub created_at: String,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub currency: String,
    pub status: OrderStatus,
    pub fulfilment_warehouse: String,
    pub payment: Payment,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    pub event_id: String,
    pub event_time: String,
    pub event_type: EventType,
    pub order: Order,
}

fn to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Random RFC 4122 version 4 identifier drawn from `rng`.
pub fn uuid_v4(rng: &mut impl Rng) -> String {
    uuid::Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .to_string()
}

pub fn make_order(rng: &mut impl Rng, now: DateTime<Utc>) -> Order {
    let created_at = timestamp(now);
    let order_id = format!("ORD-{:08X}", rng.gen::<u32>());
    let customer_id = format!("CUST-{}", rng.gen_range(1000..=9999));

    let item_count = rng.gen_range(1..=4);
    let items: Vec<OrderItem> = (0..item_count)
        .map(|_| OrderItem {
            sku: format!("SKU-{}", rng.gen_range(100..=999)),
            qty: rng.gen_range(1..=3),
            price: to_cents(rng.gen_range(5.0..200.0)),
        })
        .collect();
    let total_amount = to_cents(
        items
            .iter()
            .map(|item| f64::from(item.qty) * item.price)
            .sum(),
    );

    let status = OrderStatus::ALL[rng.gen_range(0..OrderStatus::ALL.len())];
    let payment_status = if status == OrderStatus::PaymentFailed {
        PaymentStatus::Declined
    } else {
        PaymentStatus::Authorized
    };
    let warehouse = WAREHOUSES[rng.gen_range(0..WAREHOUSES.len())];

    Order {
        order_id,
        created_at: created_at.clone(),
        customer_id,
        items,
        total_amount,
        currency: CURRENCY.to_string(),
        status,
        fulfilment_warehouse: warehouse.to_string(),
        payment: Payment {
            status: payment_status,
            attempts: 1,
        },
        last_updated: created_at,
    }
}

pub fn make_event(rng: &mut impl Rng, now: DateTime<Utc>, order: Order) -> OrderEvent {
    OrderEvent {
        event_id: uuid_v4(rng),
        event_time: timestamp(now),
        event_type: EventType::OrderCreated,
        order,
    }
}

/// Bucket key for the raw copy of an order's event.
pub fn raw_event_key(order_id: &str) -> String {
    format!("{RAW_EVENT_PREFIX}/{order_id}.json")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn orders_respect_value_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let order = make_order(&mut rng, fixed_now());
            assert!(order.order_id.starts_with("ORD-"));
            assert_eq!(order.order_id.len(), 12);
            let customer: u32 = order.customer_id["CUST-".len()..].parse().expect("digits");
            assert!((1000..=9999).contains(&customer));
            assert!((1..=4).contains(&order.items.len()));
            for item in &order.items {
                assert!((1..=3).contains(&item.qty));
                assert!((5.0..=200.0).contains(&item.price));
                assert!(item.sku.starts_with("SKU-"));
            }
            assert!(WAREHOUSES.contains(&order.fulfilment_warehouse.as_str()));
            assert_eq!(order.currency, "AUD");
            assert_eq!(order.created_at, order.last_updated);
        }
    }

    #[test]
    fn failed_payment_orders_are_declined() {
        let mut rng = StdRng::seed_from_u64(11);
        let orders: Vec<_> = (0..200).map(|_| make_order(&mut rng, fixed_now())).collect();
        assert!(orders.iter().any(|o| o.status == OrderStatus::PaymentFailed));
        for order in orders {
            let expected = if order.status == OrderStatus::PaymentFailed {
                PaymentStatus::Declined
            } else {
                PaymentStatus::Authorized
            };
            assert_eq!(order.payment.status, expected);
            assert_eq!(order.payment.attempts, 1);
        }
    }

    #[test]
    fn total_matches_line_items() {
        let mut rng = StdRng::seed_from_u64(3);
        let order = make_order(&mut rng, fixed_now());
        let expected: f64 = order
            .items
            .iter()
            .map(|item| f64::from(item.qty) * item.price)
            .sum();
        assert!((order.total_amount - expected).abs() < 0.005);
    }

    #[test]
    fn event_serializes_with_camel_case_fields() {
        let mut rng = StdRng::seed_from_u64(5);
        let order = make_order(&mut rng, fixed_now());
        let event = make_event(&mut rng, fixed_now(), order);
        let value = serde_json::to_value(&event).expect("serialize");

        assert_eq!(value["eventType"], "ORDER_CREATED");
        assert_eq!(value["eventTime"], "2026-02-14T09:30:00.000000+00:00");
        assert!(value["order"]["orderId"].is_string());
        assert!(value["order"]["fulfilmentWarehouse"].is_string());
        assert!(matches!(value["order"]["payment"]["status"], Value::String(_)));
    }

    #[test]
    fn uuid_has_version_and_variant_bits() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = uuid_v4(&mut rng);
        assert_eq!(id.len(), 36);
        assert_eq!(&id[14..15], "4");
        assert!(matches!(&id[19..20], "8" | "9" | "a" | "b"));

        let parsed = uuid::Uuid::parse_str(&id).expect("parse");
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(uuid_v4(&mut StdRng::seed_from_u64(1)), id);
    }

    #[test]
    fn raw_event_key_uses_order_id() {
        assert_eq!(raw_event_key("ORD-0000ABCD"), "raw/events/ORD-0000ABCD.json");
    }
}
