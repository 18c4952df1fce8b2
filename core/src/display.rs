/// Output formatting — XLM denomination conversion and display helpers.
///
/// The native currency uses 7 decimal places (stroops). 1 XLM = 10_000_000 stroops.
use chrono::{DateTime, Utc};

use crate::network::TransactionRecord;
use crate::poll::{ActivityEntry, Tallies, VoteChoice};

pub const STROOPS_PER_XLM: u64 = 10_000_000;

/// Convert stroops to a human-readable XLM string with exactly 7 fractional digits.
/// Examples: 15_000_000 -> "1.5000000", 0 -> "0.0000000"
#[must_use]
pub fn stroops_to_xlm(stroops: u64) -> String {
    let whole = stroops / STROOPS_PER_XLM;
    let frac = stroops % STROOPS_PER_XLM;
    format!("{whole}.{frac:07}")
}

/// Format a balance for display.
#[must_use]
pub fn format_balance(stroops: u64) -> String {
    format!("{} XLM", stroops_to_xlm(stroops))
}

/// Parse a human-readable XLM amount string into stroops.
/// Accepts: "1.5" -> 15_000_000, "1" -> 10_000_000, "0.0000001" -> 1
#[must_use = "parsing result should be checked"]
pub fn parse_xlm_amount(input: &str) -> Result<u64, String> {
    let input = input.trim();

    if input.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }

    if input.starts_with('-') {
        return Err("Amount must be positive".to_string());
    }

    // Bare integers are whole XLM
    if let Ok(xlm) = input.parse::<u64>() {
        return xlm
            .checked_mul(STROOPS_PER_XLM)
            .ok_or_else(|| "Amount too large".to_string());
    }

    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() > 2 {
        return Err("Invalid amount format. Use XLM units like '1.5' or '0.0000001'.".to_string());
    }

    let whole: u64 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid whole part: '{}'", parts[0]))?;

    let frac_stroops = if parts.len() == 2 {
        let frac_str = parts[1];
        if frac_str.is_empty() {
            // Trailing dot: "1." is treated as "1.0"
            0
        } else if frac_str.len() > 7 {
            return Err("Too many decimal places. XLM supports up to 7.".to_string());
        } else {
            let padded = format!("{:0<7}", frac_str);
            padded
                .parse::<u64>()
                .map_err(|_| format!("Invalid fractional part: '{frac_str}'"))?
        }
    } else {
        0
    };

    whole
        .checked_mul(STROOPS_PER_XLM)
        .and_then(|w| w.checked_add(frac_stroops))
        .ok_or_else(|| "Amount too large".to_string())
}

/// Shorten an address for general display: "GD4QXJ…2M8UVL"
#[must_use]
pub fn short_address(addr: &str) -> String {
    if addr.len() <= 12 {
        return addr.to_string();
    }
    format!("{}…{}", &addr[..6], &addr[addr.len() - 6..])
}

/// Shorten an address for the activity feed: "GD4Q…F7KL"
#[must_use]
pub fn feed_address(addr: &str) -> String {
    if addr.len() <= 8 {
        return addr.to_string();
    }
    format!("{}…{}", &addr[..4], &addr[addr.len() - 4..])
}

/// Render how long ago `ts` was, bucketed by scale: "30s ago", "5m ago",
/// "2h ago", "3d ago". Timestamps in the future render as "0s ago".
#[must_use]
pub fn time_ago(ts: DateTime<Utc>) -> String {
    time_ago_from(ts, Utc::now())
}

/// `time_ago` against an explicit reference instant.
#[must_use]
pub fn time_ago_from(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

/// Format the poll tallies for display.
#[must_use]
pub fn format_tallies(tallies: &Tallies) -> String {
    format!(
        "YES {} ({}%)  NO {} ({}%)  {} total votes",
        tallies.yes,
        tallies.yes_percent(),
        tallies.no,
        100 - tallies.yes_percent(),
        tallies.total(),
    )
}

/// Format the activity feed for display, newest first.
#[must_use]
pub fn format_feed(entries: &[ActivityEntry]) -> String {
    if entries.is_empty() {
        return "No activity yet.".to_string();
    }

    let now = Utc::now();
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let marker = match entry.choice {
            VoteChoice::Yes => "+",
            VoteChoice::No => "-",
        };
        let new_flag = if entry.is_new { "  [new]" } else { "" };
        lines.push(format!(
            "{marker} {:<12} {:<4} {}  {}{new_flag}",
            entry.address,
            entry.choice,
            &entry.hash[..8.min(entry.hash.len())],
            time_ago_from(entry.timestamp, now),
        ));
    }
    lines.join("\n")
}

/// Format recent account transactions for display, newest first.
#[must_use]
pub fn format_history(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return "No transactions found.".to_string();
    }

    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        let status = if record.successful { "ok " } else { "err" };
        lines.push(format!(
            "{status}  {}  {}",
            &record.hash[..10.min(record.hash.len())],
            record.created_at,
        ));
    }
    lines.join("\n")
}

/// Format balance as JSON.
#[must_use]
pub fn format_balance_json(stroops: u64) -> String {
    serde_json::json!({
        "balance_stroops": stroops,
        "balance_xlm": stroops_to_xlm(stroops),
    })
    .to_string()
}
