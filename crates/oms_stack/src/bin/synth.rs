use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use oms_stack::assembly::write_cloud_assembly;
use oms_stack::{logging, synthesize, DeploymentContext, StackProps};

#[derive(Parser)]
#[command(
    name = "synth",
    about = "Synthesize the agentic OMS data platform stack into a cloud assembly"
)]
struct Args {
    /// Target AWS account id
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    account: String,
    /// Target region; omitted for a region-agnostic template
    #[arg(long, env = "CDK_DEFAULT_REGION")]
    region: Option<String>,
    /// Logical stack identifier
    #[arg(long, default_value = "AgenticOmsCdkStack")]
    stack_id: String,
    /// Stack description written to the template
    #[arg(long)]
    description: Option<String>,
    /// Stack tag as KEY=VALUE (repeatable)
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,
    /// Local directory uploaded into the data bucket
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Output directory for the cloud assembly
    #[arg(long, default_value = "cdk.out")]
    out: PathBuf,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("tag '{raw}' must be KEY=VALUE"))?;
    if key.trim().is_empty() {
        return Err(format!("tag '{raw}' has an empty key"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    let props = StackProps {
        description: args.description,
        tags: args.tags.into_iter().collect::<BTreeMap<_, _>>(),
    };
    let mut ctx = DeploymentContext::new(args.account, args.stack_id).with_props(props);
    if let Some(region) = args.region {
        ctx = ctx.with_region(region);
    }

    let graph = synthesize(&ctx, &args.assets)?;
    let assembly = write_cloud_assembly(&graph, &args.assets, &args.out)?;

    println!("{}", assembly.template.display());
    for output in &graph.outputs {
        println!("{} = {}", output.name, output.value);
    }
    Ok(())
}
