pub mod dynamodb;
pub mod sinks;
