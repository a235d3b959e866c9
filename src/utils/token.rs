//! Formatting of base-unit amounts for display.

use crate::constants::SOL_DECIMALS;

/// Renders `amount` base units of a mint with `decimals` places, without
/// going through floating point. Trailing fractional zeros are dropped.
pub fn format_base_units(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let width = usize::from(decimals) + 1;
    let digits = format!("{:0>width$}", amount, width = width);
    let (int_part, frac_part) = digits.split_at(digits.len() - usize::from(decimals));
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Renders lamports as SOL, e.g. `100000000` as `0.1 SOL`.
pub fn format_lamports(lamports: u64) -> String {
    format!("{} SOL", format_base_units(lamports, SOL_DECIMALS))
}
