//! Turns raw recipient input into validated [`RecipientEntry`]s.
//!
//! Text input is read one physical line at a time, so line numbers match
//! what the user sees in an editor. Rows are validated independently: an
//! invalid row is recorded in `rejected` with its line number and never
//! stops the others.

use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::models::{
    NormalizedRecipients, RawRecipientRow, RecipientEntry, RecipientInput, RejectionReason,
    RowRejection, TokenAmount,
};

pub fn normalize(input: RecipientInput) -> NormalizedRecipients {
    let mut normalized = NormalizedRecipients::default();

    match input {
        RecipientInput::Text { data, has_header } => {
            let mut header_pending = has_header;
            for (index, raw_line) in data.lines().enumerate() {
                let line = index + 1;
                if raw_line.trim().is_empty() {
                    continue;
                }
                if header_pending {
                    header_pending = false;
                    continue;
                }

                match split_line(raw_line) {
                    Ok(fields) => {
                        if fields.len() > 2 {
                            debug!("Ignoring {} extra column(s) on line {}", fields.len() - 2, line);
                        }
                        let address = fields.first().map(String::as_str).unwrap_or_default();
                        let amount = fields.get(1).map(String::as_str).unwrap_or_default();
                        push_row(&mut normalized, line, address, amount);
                    }
                    Err(e) => {
                        warn!("Skipping unreadable recipient row on line {}: {}", line, e);
                        normalized.rejected.push(RowRejection {
                            line,
                            address: String::new(),
                            amount: String::new(),
                            reason: RejectionReason::MalformedRow(e.to_string()),
                        });
                    }
                }
            }
        }
        RecipientInput::Rows(rows) => {
            for (index, RawRecipientRow { address, amount }) in rows.iter().enumerate() {
                push_row(&mut normalized, index + 1, address, amount);
            }
        }
    }

    debug!(
        "Normalized {} recipient(s), rejected {} row(s)",
        normalized.entries.len(),
        normalized.rejected.len()
    );
    normalized
}

/// Splits one physical line into trimmed fields.
///
/// Quoting is off so a stray quote cannot swallow the following lines; a
/// field wrapped in a matching pair of quotes is unwrapped.
fn split_line(line: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(|field| unquote(field).to_string()).collect()),
        None => Ok(Vec::new()),
    }
}

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .map_or(field, str::trim)
}

fn push_row(normalized: &mut NormalizedRecipients, line: usize, address: &str, amount: &str) {
    match validate_row(address, amount) {
        Ok(entry) => {
            normalized.entries.push(entry);
            normalized.lines.push(line);
        }
        Err(reason) => {
            debug!("Rejected recipient row on line {}: {}", line, reason);
            normalized.rejected.push(RowRejection {
                line,
                address: address.to_string(),
                amount: amount.to_string(),
                reason,
            });
        }
    }
}

fn validate_row(address: &str, amount: &str) -> Result<RecipientEntry, RejectionReason> {
    let address = address.trim();
    if address.is_empty() {
        return Err(RejectionReason::EmptyAddress);
    }
    let address = Pubkey::from_str(address)
        .map_err(|_| RejectionReason::InvalidAddress(address.to_string()))?;
    let amount = TokenAmount::from_str(amount)?;
    Ok(RecipientEntry { address, amount })
}
