//! Cost line decoding.
//!
//! A cost line is `LINE COST COST ...`. Each token is relative to the
//! previous cost line of the same block:
//! - `+N` / `-N` adds to the previous value in that column
//! - `*` repeats the previous value
//! - anything else is a literal (decimal or `0x` hex)
//!
//! Trailing zero columns may be dropped by the writer; short lines are padded
//! with literal zeros before decoding.

use crate::utils::config::CALL_COST_SENTINEL;
use crate::utils::error::DecodeError;

/// One decoded cost line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCost {
    /// Source line number (first column)
    pub line_number: i64,

    /// One value per event
    pub costs: Vec<i64>,

    /// `[line_number] + costs`, kept as state for the next line
    pub full: Vec<i64>,
}

/// Decode a cost line against the previous absolute vector of its block
///
/// # Arguments
/// * `line` - Raw data line
/// * `event_count` - Number of events declared by the `events` header
/// * `previous` - Previous full vector in this block, `None` at block start;
///   relative tokens with no previous column are decoded against zero
///
/// # Errors
/// * `DecodeError::InvalidToken` - a token is not an integer, delta or `*`
/// * `DecodeError::TooManyColumns` - more tokens than `event_count + 1`
pub fn decode_cost_line(
    line: &str,
    event_count: usize,
    previous: Option<&[i64]>,
) -> Result<DecodedCost, DecodeError> {
    let width = event_count + 1;
    let mut tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.len() > width {
        return Err(DecodeError::TooManyColumns {
            expected: width,
            found: tokens.len(),
        });
    }

    // Padded columns decode as literal zero
    tokens.resize(width, "0");

    let full = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            // Columns without a previous value start from zero
            let baseline = previous
                .and_then(|prev| prev.get(index))
                .copied()
                .unwrap_or(0);
            decode_token(token, baseline)
        })
        .collect::<Result<Vec<i64>, DecodeError>>()?;

    Ok(DecodedCost {
        line_number: full[0],
        costs: full[1..].to_vec(),
        full,
    })
}

/// Decode one column relative to its baseline
///
/// `baseline` is the same column of the previous line in the block. When
/// there is none (first line of a block, or a column the previous line did
/// not carry), the baseline is zero: `+4` decodes to 4 and `*` to 0.
/// Deltas saturate at the `i64` bounds.
fn decode_token(token: &str, baseline: i64) -> Result<i64, DecodeError> {
    if token == "*" {
        return Ok(baseline);
    }

    let value = parse_integer(token).ok_or_else(|| DecodeError::InvalidToken(token.to_string()))?;

    if token.starts_with('+') || token.starts_with('-') {
        Ok(baseline.saturating_add(value))
    } else {
        Ok(value)
    }
}

/// Decode the line following a `calls=` line
///
/// Call-cost lines are never relative: every token is a literal, and `*`
/// stands for a fixed sentinel.
pub fn decode_call_cost_line(line: &str) -> Result<Vec<i64>, DecodeError> {
    line.split_whitespace()
        .map(|token| {
            if token == "*" {
                Ok(CALL_COST_SENTINEL)
            } else {
                parse_integer(token).ok_or_else(|| DecodeError::InvalidToken(token.to_string()))
            }
        })
        .collect()
}

/// Parse a signed decimal or `0x` hex integer
pub fn parse_integer(token: &str) -> Option<i64> {
    let (negative, digits) = match token.as_bytes().first()? {
        b'+' => (false, &token[1..]),
        b'-' => (true, &token[1..]),
        _ => (false, token),
    };

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<i64>().ok()?
    };

    Some(if negative { -magnitude } else { magnitude })
}
