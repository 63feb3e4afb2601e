//! Unit Conversion Utilities
//!
//! Helpers for Bitcoin unit conversions and formatting.
//!
//! Conversion into satoshis always rounds down: a deposit never carries
//! satoshis the user did not explicitly ask for.

use bitcoin::{Amount, Denomination};

/// Satoshis per Bitcoin
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Fractional digits of a BTC amount that are whole satoshis
const BTC_DECIMALS: usize = 8;

/// Convert BTC to satoshis, rounding down.
///
/// Works on the decimal the `f64` stands for (its shortest round-trip
/// text, which is also what serde_json sends to the bridge), not on its
/// binary value: `0.00012215` is 12,215 satoshis even though the nearest
/// `f64` lies just below it.
///
/// Negative and non-finite inputs saturate to zero, amounts that overflow
/// to `u64::MAX`; callers validate the amount before converting.
pub fn btc_to_sats(btc: f64) -> u64 {
    if !btc.is_finite() || btc <= 0.0 {
        return 0;
    }

    // f64's Display never uses exponent notation
    let text = btc.to_string();
    let truncated = match text.split_once('.') {
        Some((whole, frac)) if frac.len() > BTC_DECIMALS => {
            format!("{}.{}", whole, &frac[..BTC_DECIMALS])
        }
        _ => text,
    };

    Amount::from_str_in(&truncated, Denomination::Bitcoin)
        .map(Amount::to_sat)
        .unwrap_or(u64::MAX)
}

/// Convert satoshis to BTC
pub fn sats_to_btc(sats: u64) -> f64 {
    sats as f64 / SATS_PER_BTC as f64
}

/// Convert satoshis to human-readable string
/// e.g., 100000 -> "100,000 sats (0.00100000 BTC)"
pub fn sats_to_display(sats: u64) -> String {
    format!("{} sats ({:.8} BTC)", format_with_commas(sats), sats_to_btc(sats))
}

/// Format number with thousands separators
pub fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}
