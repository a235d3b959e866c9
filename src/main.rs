//! # soldrop
//!
//! Command-line front end for batch SPL token distributions.
//!
//! ## Usage
//!
//! ```bash
//! soldrop plan --mint <MINT> --recipients recipients.csv --has-header
//! soldrop distribute --mint <MINT> --recipients recipients.csv --has-header
//! ```
//!
//! Settings come from the JSON file at `CONFIG_PATH` and the environment
//! (`KEYPAIR_PATH`, `RPC_URL`, `LOG_LEVEL`, `LOG_MODE`).
use clap::{Args, Parser, Subcommand};
use color_eyre::{eyre::WrapErr, Result};
use dotenvy::dotenv;
use log::{info, warn};
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use soldrop::{
    config::{load_config, DistributionConfig, EnvConfig},
    domain::{
        progress_channel, CancellationFlag, DistributionEngine, DistributionPlan, ProgressStream,
    },
    logging::setup_logging,
    models::{DistributionError, DistributionReport, RecipientInput, RecipientStatus, RowRejection},
    services::{
        broadcaster::SolanaBroadcaster, provider::SolanaProvider, signer::LocalSigner,
    },
    utils::{format_base_units, format_lamports},
};

type Engine = DistributionEngine<SolanaProvider, SolanaBroadcaster<SolanaProvider, LocalSigner>>;

#[derive(Parser, Debug)]
#[command(name = "soldrop", version, about = "Distribute SPL tokens to many recipients")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a distribution
    Distribute {
        #[command(flatten)]
        input: InputArgs,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the batch plan without submitting anything
    Plan {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Mint address of the token to distribute
    #[arg(long)]
    mint: String,
    /// CSV file of `address,amount` rows
    #[arg(long)]
    recipients: PathBuf,
    /// Treat the first row as a header
    #[arg(long)]
    has_header: bool,
}

impl InputArgs {
    fn read_recipients(&self) -> Result<RecipientInput> {
        let data = std::fs::read_to_string(&self.recipients).wrap_err_with(|| {
            format!("Failed to read recipients file {}", self.recipients.display())
        })?;
        Ok(RecipientInput::Text {
            data,
            has_header: self.has_header,
        })
    }
}

fn load_distribution_config(env_config: &EnvConfig) -> Result<DistributionConfig> {
    let mut config = if env_config.config_path.exists() {
        load_config(&env_config.config_path).wrap_err_with(|| {
            format!(
                "Failed to load config file {}",
                env_config.config_path.display()
            )
        })?
    } else {
        warn!(
            "Config file {} not found, using defaults",
            env_config.config_path.display()
        );
        DistributionConfig::default()
    };

    if let Some(rpc_url) = &env_config.rpc_url {
        config.rpc_url = Some(rpc_url.clone());
        config.validate()?;
    }
    Ok(config)
}

async fn build_engine(env_config: &EnvConfig, config: DistributionConfig) -> Result<Engine> {
    let commitment = config.commitment.to_commitment_config();
    let provider = Arc::new(SolanaProvider::new(
        &config.rpc_url(),
        config.rpc_timeout_seconds,
        commitment,
    )?);
    let signer = Arc::new(LocalSigner::from_file(&env_config.keypair_path)?);
    let broadcaster = Arc::new(SolanaBroadcaster::new(
        provider.clone(),
        signer.clone(),
        commitment,
        config.confirmation_poll_interval(),
    ));

    let engine =
        DistributionEngine::with_signer(provider, broadcaster, signer.as_ref(), config).await?;
    info!(
        "Funding account {} on {} ({})",
        engine.funder(),
        engine.config().network,
        engine.config().rpc_url()
    );
    Ok(engine)
}

fn print_plan(plan: &DistributionPlan) {
    let decimals = plan.asset.decimals;
    println!(
        "Mint {} ({:?}, {} decimals)",
        plan.asset.mint, plan.asset.token_program, decimals
    );
    println!(
        "{} recipient(s), {} total, {} account(s) to create",
        plan.recipient_count(),
        format_base_units_u128(plan.total_base_units(), decimals),
        plan.creation_count()
    );
    if let Some(lamports) = plan.fee_lamports() {
        println!("Platform fee: {}", format_lamports(lamports));
    }
    for batch in &plan.batches {
        println!(
            "  batch {:>3}: {} transfer(s), {} creation(s){}",
            batch.index,
            batch.transfer_count(),
            batch.creation_count(),
            if batch.has_fee() { ", platform fee" } else { "" }
        );
    }
    print_rejections(&plan.rejected_rows);
}

fn print_rejections(rejected: &[RowRejection]) {
    for rejection in rejected {
        println!(
            "  skipped line {}: {:?} {:?} ({})",
            rejection.line, rejection.address, rejection.amount, rejection.reason
        );
    }
}

fn format_base_units_u128(value: u128, decimals: u8) -> String {
    match u64::try_from(value) {
        Ok(value) => format_base_units(value, decimals),
        Err(_) => format!("{} base units", value),
    }
}

fn print_report(report: &DistributionReport, config: &DistributionConfig) {
    for batch in &report.batches {
        match &batch.signature {
            Some(signature) => println!(
                "  batch {:>3}: {:?} {}",
                batch.batch_index,
                batch.state,
                config.network.explorer_tx_url(&signature.to_string())
            ),
            None => println!("  batch {:>3}: {:?}", batch.batch_index, batch.state),
        }
    }
    for outcome in &report.outcomes {
        let status = match &outcome.status {
            RecipientStatus::Success => "ok".to_string(),
            RecipientStatus::Failed(reason) => format!("failed: {}", reason),
            RecipientStatus::NotSubmitted => "not submitted".to_string(),
        };
        println!("  {} {} {}", outcome.address, outcome.amount, status);
    }
    println!(
        "{} succeeded, {} failed, {} row(s) skipped",
        report.succeeded(),
        report.failed(),
        report.rejected_rows.len()
    );
}

/// Writes recipients that did not succeed next to the input file.
fn write_failed_recipients(report: &DistributionReport, input: &Path) -> Result<Option<PathBuf>> {
    let failed = report.failed_recipients();
    if failed.is_empty() {
        return Ok(None);
    }

    let mut path = input.as_os_str().to_owned();
    path.push(".failed.csv");
    let path = PathBuf::from(path);

    let mut writer = csv::Writer::from_path(&path)
        .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["address", "amount"])?;
    for entry in failed {
        writer.write_record([entry.address.to_string(), entry.amount.to_string()])?;
    }
    writer.flush()?;
    Ok(Some(path))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn log_progress(mut stream: ProgressStream) {
    use futures::StreamExt;

    while let Some(update) = stream.next().await {
        info!("{}: {}/{}", update.phase, update.current, update.total);
    }
}

/// Plans the distribution and prints it. When no row survives, the rejected
/// rows are printed before the error is returned.
async fn plan_distribution(engine: &Engine, input: &InputArgs) -> Result<DistributionPlan> {
    match engine.plan(&input.mint, input.read_recipients()?).await {
        Ok(plan) => {
            print_plan(&plan);
            Ok(plan)
        }
        Err(DistributionError::EmptyRecipientList { rejected }) => {
            print_rejections(&rejected);
            Err(DistributionError::EmptyRecipientList { rejected }.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn distribute(engine: &Engine, input: &InputArgs, skip_prompt: bool) -> Result<()> {
    let plan = plan_distribution(engine, input).await?;
    if !skip_prompt && !confirm("Submit this distribution?")? {
        println!("Aborted");
        return Ok(());
    }

    let cancel = CancellationFlag::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, no further batches will be submitted");
                cancel.cancel();
            }
        })
    };

    let (progress, stream) = progress_channel();
    let progress_logger = tokio::spawn(log_progress(stream));

    let report = engine.execute(plan, progress, &cancel).await;
    ctrl_c.abort();
    let _ = progress_logger.await;

    print_report(&report, engine.config());
    if let Some(path) = write_failed_recipients(&report, &input.recipients)? {
        println!("Failed recipients written to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    setup_logging()?;

    let cli = Cli::parse();
    let env_config = EnvConfig::from_env();
    let config = load_distribution_config(&env_config)?;
    let engine = build_engine(&env_config, config).await?;

    match &cli.command {
        Command::Plan { input } => {
            plan_distribution(&engine, input).await?;
        }
        Command::Distribute { input, yes } => distribute(&engine, input, *yes).await?,
    }
    Ok(())
}
