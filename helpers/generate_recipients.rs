//! Recipient List Generation Tool
//!
//! Writes a CSV of random recipients with random amounts, useful for trying
//! out distributions on devnet.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example generate_recipients -- --count 50 --output recipients.csv
//! ```
use clap::Parser;
use eyre::{eyre, Result, WrapErr};
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Number of recipients to generate
    #[arg(long, default_value_t = 25)]
    count: usize,
    /// Largest whole amount per recipient
    #[arg(long, default_value_t = 1000)]
    max_amount: u64,
    /// Output file
    #[arg(long, default_value = "recipients.csv")]
    output: PathBuf,
}

/// Main entry point for recipient list generation tool
fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate_recipients(args.count, args.max_amount)?;

    let mut writer = csv::Writer::from_path(&args.output)
        .wrap_err_with(|| format!("Failed to create {}", args.output.display()))?;
    writer.write_record(["address", "amount"])?;
    for (address, amount) in &rows {
        writer.write_record([address.as_str(), amount.as_str()])?;
    }
    writer.flush()?;

    println!("Wrote {} recipients to {}", rows.len(), args.output.display());
    Ok(())
}

/// Random `(address, amount)` rows; amounts carry up to two decimals.
fn generate_recipients(count: usize, max_amount: u64) -> Result<Vec<(String, String)>> {
    if max_amount == 0 {
        return Err(eyre!("max_amount must be at least 1"));
    }

    let mut rng = rand::rng();
    Ok((0..count)
        .map(|_| {
            let address = Pubkey::new_from_array(rng.random::<[u8; 32]>());
            let whole = rng.random_range(0..max_amount);
            let cents = rng.random_range(1..100u64);
            (address.to_string(), format!("{}.{:02}", whole, cents))
        })
        .collect())
}
