use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the agentic OMS infrastructure workspace",
    long_about = "A unified CLI for synthesizing the OMS data platform stack,\n\
                  generating synthetic orders, and running CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the stack into a cloud assembly
    Synth {
        /// Target AWS account id
        #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
        account: String,
        /// Target region
        #[arg(long, env = "CDK_DEFAULT_REGION")]
        region: Option<String>,
        /// Output directory
        #[arg(long, default_value = "cdk.out")]
        out: String,
    },
    /// Generate synthetic orders against a deployed stack
    Generate {
        /// Data bucket name (the DataBucket stack output)
        #[arg(long, env = "OMS_DATA_BUCKET")]
        bucket: String,
        /// Orders table name (the OrdersTable stack output)
        #[arg(long, env = "OMS_ORDERS_TABLE")]
        table: String,
        /// Number of orders
        #[arg(long, default_value_t = 200)]
        count: usize,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run CI checks (fmt, clippy, tests, synth smoke run)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Synthesize against a placeholder account
    Synth,
    /// Run check + synth
    All,
}

const CI_ACCOUNT: &str = "123456789012";
const CI_ASSEMBLY_DIR: &str = "target/ci-cdk.out";

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn synth(account: &str, region: Option<&str>, out: &str) {
    let mut args = vec![
        "run", "-p", "oms_stack", "--bin", "synth", "--", "--account", account, "--out", out,
    ];
    if let Some(region) = region {
        args.extend(["--region", region]);
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test oms_stack");
    run_cargo(&["test", "-p", "oms_stack"]);

    step("Test oms_generator");
    run_cargo(&["test", "-p", "oms_generator"]);
}

fn ci_synth() {
    step("Synthesize stack");
    synth(CI_ACCOUNT, Some("us-east-1"), CI_ASSEMBLY_DIR);

    let template = Path::new(CI_ASSEMBLY_DIR).join("AgenticOmsCdkStack.template.json");
    if !template.exists() {
        eprintln!("expected template at '{}'", template.display());
        exit(1);
    }
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Synth {
            account,
            region,
            out,
        } => {
            synth(&account, region.as_deref(), &out);
        }
        Commands::Generate {
            bucket,
            table,
            count,
            seed,
        } => {
            let count = count.to_string();
            let seed = seed.map(|value| value.to_string());
            let mut args = vec![
                "run",
                "-p",
                "oms_generator",
                "--bin",
                "generate_orders",
                "--",
                "--bucket",
                bucket.as_str(),
                "--table",
                table.as_str(),
                "--count",
                count.as_str(),
            ];
            if let Some(seed) = seed.as_deref() {
                args.extend(["--seed", seed]);
            }
            run_cargo(&args);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Synth => ci_synth(),
                CiJob::All => {
                    ci_check();
                    ci_synth();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
