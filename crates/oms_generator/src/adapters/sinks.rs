use crate::order::Order;

pub trait OrderTable {
    fn put_order(&self, order: &Order) -> Result<(), String>;
}

pub trait EventStream {
    fn put_event(&self, partition_key: &str, payload: &[u8]) -> Result<(), String>;
}

pub trait RawEventStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String>;
}
