use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_s3::primitives::ByteStream;
use clap::Parser;
use oms_generator::adapters::dynamodb::order_item;
use oms_generator::adapters::sinks::{EventStream, OrderTable, RawEventStore};
use oms_generator::config::{
    sleep_from_secs, GeneratorConfig, DEFAULT_COUNT, DEFAULT_REGION, DEFAULT_SLEEP_SECS,
    DEFAULT_TABLE,
};
use oms_generator::order::Order;
use oms_generator::runner::{run_generator, GeneratorSinks};
use oms_stack::logging;
use oms_stack::stack::STREAM_NAME;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Handle;

#[derive(Parser)]
#[command(
    name = "generate_orders",
    about = "Write synthetic OMS orders to DynamoDB, Kinesis and S3"
)]
struct Args {
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,
    /// Data bucket receiving raw events under raw/events/
    #[arg(long, env = "OMS_DATA_BUCKET")]
    bucket: String,
    #[arg(long, env = "OMS_ORDERS_TABLE", default_value = DEFAULT_TABLE)]
    table: String,
    #[arg(long, env = "OMS_EVENTS_STREAM", default_value = STREAM_NAME)]
    stream: String,
    #[arg(long, default_value_t = DEFAULT_COUNT)]
    count: usize,
    /// Pause between orders, in seconds
    #[arg(long, default_value_t = DEFAULT_SLEEP_SECS)]
    sleep: f64,
    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

struct DynamoOrderTable {
    table: String,
    client: aws_sdk_dynamodb::Client,
    handle: Handle,
}

impl OrderTable for DynamoOrderTable {
    fn put_order(&self, order: &Order) -> Result<(), String> {
        let item = order_item(order)?;
        let table = self.table.clone();
        let client = self.client.clone();

        self.handle.block_on(async move {
            client
                .put_item()
                .table_name(table)
                .set_item(Some(item))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to put order item: {error}"))
        })
    }
}

struct KinesisEventStream {
    stream: String,
    client: aws_sdk_kinesis::Client,
    handle: Handle,
}

impl EventStream for KinesisEventStream {
    fn put_event(&self, partition_key: &str, payload: &[u8]) -> Result<(), String> {
        let stream = self.stream.clone();
        let key = partition_key.to_string();
        let data = Blob::new(payload.to_vec());
        let client = self.client.clone();

        self.handle.block_on(async move {
            client
                .put_record()
                .stream_name(stream)
                .partition_key(key)
                .data(data)
                .send()
                .await
                .map(|output| {
                    tracing::debug!(
                        shard_id = ?output.shard_id(),
                        sequence_number = ?output.sequence_number(),
                        "record put"
                    );
                })
                .map_err(|error| format!("failed to put kinesis record: {error}"))
        })
    }
}

struct S3RawEventStore {
    bucket: String,
    client: aws_sdk_s3::Client,
    handle: Handle,
}

impl RawEventStore for S3RawEventStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.client.clone();

        self.handle.block_on(async move {
            client
                .put_object()
                .bucket(bucket)
                .key(object_key)
                .content_type("application/json")
                .body(ByteStream::from(body_bytes))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to write object to s3: {error}"))
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::init();
    let args = Args::parse();

    let config = GeneratorConfig {
        region: args.region.clone(),
        bucket: args.bucket,
        table: args.table,
        stream: args.stream,
        count: args.count,
        sleep: sleep_from_secs(args.sleep)?,
    };
    config.validate()?;

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(args.region))
        .load()
        .await;
    let handle = Handle::current();
    let table = DynamoOrderTable {
        table: config.table.clone(),
        client: aws_sdk_dynamodb::Client::new(&aws_config),
        handle: handle.clone(),
    };
    let stream = KinesisEventStream {
        stream: config.stream.clone(),
        client: aws_sdk_kinesis::Client::new(&aws_config),
        handle: handle.clone(),
    };
    let raw_events = S3RawEventStore {
        bucket: config.bucket.clone(),
        client: aws_sdk_s3::Client::new(&aws_config),
        handle,
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Sinks block on the runtime handle, so the loop runs off the async workers.
    let report = tokio::task::spawn_blocking(move || {
        let sinks = GeneratorSinks {
            table: &table,
            stream: &stream,
            raw_events: &raw_events,
        };
        run_generator(&config, &sinks, &mut rng, chrono::Utc::now)
    })
    .await??;

    println!("{} orders generated", report.orders_written);
    Ok(())
}
