//! JSON to DynamoDB attribute conversion for order items.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;

use crate::order::Order;

/// Numbers are written as `N` strings so prices keep their decimal text.
pub fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute_value).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), to_attribute_value(value)))
                .collect(),
        ),
    }
}

pub fn order_item(order: &Order) -> Result<HashMap<String, AttributeValue>, String> {
    let value = serde_json::to_value(order)
        .map_err(|error| format!("failed to serialize order: {error}"))?;
    match to_attribute_value(&value) {
        AttributeValue::M(item) => Ok(item),
        _ => Err("order did not serialize to a JSON object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::order::{OrderItem, OrderStatus, Payment, PaymentStatus};

    fn sample_order() -> Order {
        Order {
            order_id: "ORD-0000ABCD".to_string(),
            created_at: "2026-02-14T09:30:00.000000+00:00".to_string(),
            customer_id: "CUST-1234".to_string(),
            items: vec![OrderItem {
                sku: "SKU-101".to_string(),
                qty: 2,
                price: 19.95,
            }],
            total_amount: 39.9,
            currency: "AUD".to_string(),
            status: OrderStatus::Placed,
            fulfilment_warehouse: "WH-2".to_string(),
            payment: Payment {
                status: PaymentStatus::Authorized,
                attempts: 1,
            },
            last_updated: "2026-02-14T09:30:00.000000+00:00".to_string(),
        }
    }

    #[test]
    fn order_item_keys_by_order_id() {
        let item = order_item(&sample_order()).expect("item");
        assert_eq!(
            item.get("orderId"),
            Some(&AttributeValue::S("ORD-0000ABCD".to_string()))
        );
        assert_eq!(
            item.get("totalAmount"),
            Some(&AttributeValue::N("39.9".to_string()))
        );
        assert_eq!(
            item.get("status"),
            Some(&AttributeValue::S("PLACED".to_string()))
        );
    }

    #[test]
    fn nested_values_convert_recursively() {
        let value = json!({ "items": [ { "qty": 2, "gift": false } ], "note": null });
        let AttributeValue::M(fields) = to_attribute_value(&value) else {
            panic!("expected map");
        };
        let AttributeValue::L(items) = &fields["items"] else {
            panic!("expected list");
        };
        let AttributeValue::M(first) = &items[0] else {
            panic!("expected map");
        };
        assert_eq!(first["qty"], AttributeValue::N("2".to_string()));
        assert_eq!(first["gift"], AttributeValue::Bool(false));
        assert_eq!(fields["note"], AttributeValue::Null(true));
    }
}
