use anyhow::{bail, Context, Result};
use jmxmon_agent::config::{split_args, AgentConfig};
use jmxmon_agent::scheduler::PollScheduler;
use jmxmon_agent::targets::parse_targets;
use jmxmon_collector::TargetSampler;
use jmxmon_common::spec::AttributeSpec;
use jmxmon_common::types::Period;
use jmxmon_jolokia::JolokiaTransport;
use jmxmon_output::OutputManager;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config/agent.toml";

const USAGE: &str = "\
Usage: jmxmon-agent [config.toml | propfile=config.toml] [key=value ...]

Samples garbage collection, CPU and custom attributes of remote JVMs
through their Jolokia agents and writes rates every period.

Without a path, config/agent.toml is read when it exists.

Settings (file keys; command line overrides the file):
  url=host:port[,host:port...]   targets (required)
  servername=name[,name...]      display names, one per target or shared
  usr=... pwd=...                credentials, one per target or shared
  period_secs=10                 polling period in seconds
  console=true                   print results on stdout
  summary_file=jmxmon.summary.txt  latest values as key=value (empty: off)
  csv_file=jmxmon.csv            append all results as CSV (empty: off)
  all_gc_values=false            also write one GC CSV per target
  error_file=jmxmon.error.log    append target failures (empty: off)
  attr1=mode; title; attribute; objectPattern[; method[; type; value]...]
";

fn load_config(args: &[String]) -> Result<AgentConfig> {
    let (path, overrides) = split_args(args);

    let mut config = match path {
        Some(path) => AgentConfig::load(&path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => AgentConfig::load(DEFAULT_CONFIG)?,
        None => AgentConfig::default(),
    };
    config.apply_overrides(&overrides)?;
    Ok(config)
}

async fn wait_for_ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jmxmon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print!("{USAGE}");
        return Ok(());
    }

    let config = load_config(&args)?;
    tracing::info!(config = %config.describe(), "jmxmon-agent starting");
    if config.url.trim().is_empty() {
        eprint!("{USAGE}");
        bail!("No target address configured");
    }

    let targets = parse_targets(
        config.servername.as_deref(),
        &config.url,
        config.usr.as_deref(),
        config.pwd.as_deref(),
    )
    .context("Invalid target list")?;
    let specs = AttributeSpec::parse_all(&config.attributes).context("Invalid attribute list")?;

    let transport =
        JolokiaTransport::new(config.jolokia.clone()).context("Failed to build Jolokia client")?;
    let sampler = TargetSampler::new(Arc::new(transport));
    let outputs = OutputManager::from_settings(&config.output_settings());
    tracing::info!(writers = ?outputs.writer_names(), "Outputs enabled");

    let mut scheduler = PollScheduler::new(
        sampler,
        targets,
        specs,
        Period::from_secs(config.period_secs),
        outputs,
    );
    scheduler.run(wait_for_ctrl_c()).await;

    Ok(())
}
