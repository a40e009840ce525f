use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use veribench::batch::{run_batch, BatchConfig};
use veribench::config::BenchConfig;
use veribench::enumerate::ExperimentTree;
use veribench::join::{JoinContext, JoinEngine, JoinSummary, TreeLayout};
use veribench::models::{ConsistencyLevel, VerificationMode};
use veribench::supervisor::{RunOptions, Supervisor};

#[derive(Parser)]
#[command(name = "veribench")]
#[command(about = "Benchmark consistency verifiers under resource ceilings", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the verifier on every history of an execution tree
    Verify {
        /// Bulk execution directory (<configId>/<runId>)
        #[arg(long)]
        inp: PathBuf,

        /// Bulk verification directory
        #[arg(long)]
        out: PathBuf,

        /// Tag to refer to this batch later
        #[arg(long)]
        tag: String,

        /// Consistency level to check (omit to search for the minimal violation)
        #[arg(long, value_parser = parse_level)]
        consistency: Option<ConsistencyLevel>,

        /// Use the sat-based strategy
        #[arg(long)]
        sat: bool,

        /// Free-form comment stored with every row
        #[arg(long)]
        comment: Option<String>,

        /// Histories were generated with partitioned writes
        #[arg(long)]
        partitioned: bool,

        /// Override the wall-clock timeout per run
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Join results across verification modes for one database
    Join {
        /// Database name prefixing the result trees (e.g. galera)
        db_name: Option<String>,

        /// Root of the execution trees (default: $DBCOP_INP_DIR)
        #[arg(long)]
        exec_root: Option<PathBuf>,

        /// Root of the verification trees (default: $DBCOP_OUT_DIR)
        #[arg(long)]
        veri_root: Option<PathBuf>,

        /// Level the database promises (default: known per database)
        #[arg(long, value_parser = parse_level)]
        target: Option<ConsistencyLevel>,
    },
}

fn parse_level(s: &str) -> Result<ConsistencyLevel, String> {
    s.parse().map_err(|e: veribench::BenchError| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    veribench::logging::init();

    let config = BenchConfig::load(cli.config.as_deref())?.with_env();

    match cli.command {
        Commands::Verify {
            inp,
            out,
            tag,
            consistency,
            sat,
            comment,
            partitioned,
            timeout_secs,
        } => {
            let mut ceilings = config.ceilings();
            if let Some(secs) = timeout_secs {
                ceilings.wall_clock_timeout = Duration::from_secs(secs);
            }
            let batch = BatchConfig {
                input: inp,
                output: out,
                partitioned,
                verifier: config.verifier_program(),
                options: RunOptions { consistency, sat },
                tag,
                comment,
            };
            let report = run_batch(&batch, &Supervisor::new(ceilings))?;
            eprintln!(
                "{} {} runs, {} timed out, {} failed to launch",
                "verified".green().bold(),
                report.completed,
                report.timed_out,
                report.launch_failures
            );
            Ok(())
        }
        Commands::Join {
            db_name,
            exec_root,
            veri_root,
            target,
        } => {
            let Some(db_name) = db_name.or_else(|| config.db_name.clone()) else {
                bail!("No database name given (argument or `db_name` in config)");
            };
            let exec_root = exec_root
                .or_else(|| config.exec_root.clone())
                .context("No execution root: pass --exec-root or set DBCOP_INP_DIR")?;
            let veri_root = veri_root
                .or_else(|| config.veri_root.clone())
                .context("No verification root: pass --veri-root or set DBCOP_OUT_DIR")?;
            let target = target.or_else(|| ConsistencyLevel::target_for_database(&db_name));

            let layout = TreeLayout::new(exec_root, veri_root, db_name);
            join_all(layout, &config, target)
        }
    }
}

fn join_all(
    layout: TreeLayout,
    config: &BenchConfig,
    target: Option<ConsistencyLevel>,
) -> Result<()> {
    let mut ctx = JoinContext::for_layout(&layout);
    if !ctx.sat_available() {
        eprintln!(
            "{} no sat results under {}, sat fields are meaningless",
            "note:".yellow().bold(),
            layout.mode_tree(VerificationMode::Sat, false).display()
        );
    }
    let engine = JoinEngine::new(layout.clone(), Box::new(config.probe()));

    for partitioned in [true, false] {
        let tree = ExperimentTree::new(layout.exec_tree(partitioned), partitioned);
        for (key, _) in tree.scan()? {
            let record = engine
                .join(&mut ctx, &key)
                .with_context(|| format!("Failed to join {key}"))?;
            let line = json!({
                "record": record,
                "algo_verdict": target.map(|t| record.algo_verdict(t)),
                "sat_verdict": target.map(|t| record.sat_verdict(t)),
            });
            println!("{line}");
        }
    }

    print_summary(&ctx.summary());
    Ok(())
}

fn print_summary(summary: &JoinSummary) {
    eprintln!("{} {} histories", "joined".green().bold(), summary.joined);
    for partition in &summary.partitions {
        if partition.violations.is_empty() {
            continue;
        }
        let label = if partition.partitioned {
            "Disjoint violations"
        } else {
            "No-disjoint violations"
        };
        eprintln!("{}", label.bold());
        for (level, count) in &partition.violations {
            eprintln!("\t{level} {count}");
        }
        if let Some(mean) = partition.mean_sat_timeout_transactions {
            eprintln!(
                "\t{} sat timeouts, mean {:.1} transactions",
                partition.sat_timeouts, mean
            );
        }
    }
    if let Some(overhead) = summary.overhead_percent {
        eprintln!("verifier overhead: {overhead:.2}% of execution time");
    }
}
