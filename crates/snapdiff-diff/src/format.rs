//! Human-readable sizes and size changes.

use humansize::{FormatSizeOptions, WINDOWS, format_size};

fn size_options() -> FormatSizeOptions {
    FormatSizeOptions::from(WINDOWS).decimal_places(2).decimal_zeroes(0)
}

/// Format a byte count with 1024-based units, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, size_options())
}

/// Format a byte delta with an explicit sign, e.g. `+2 B` or `-1.5 KB`.
pub fn format_signed_bytes(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "+" };
    format!("{sign}{}", format_bytes(bytes.unsigned_abs()))
}

/// Percentage change from `old` to `new`, signed, at most two decimals.
///
/// An `old` of zero has no meaningful base and reports `+0`.
pub fn format_percent(old: u64, new: u64) -> String {
    let percent = if old == 0 {
        0.0
    } else {
        (new as f64 - old as f64) * 100.0 / old as f64
    };

    let rounded = format!("{:.2}", percent.abs());
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    let sign = if percent < 0.0 && trimmed != "0" {
        "-"
    } else {
        "+"
    };
    format!("{sign}{trimmed}")
}

/// Size change between two file versions, e.g. `+2 B (+20%)`.
pub fn format_size_diff(old: u64, new: u64) -> String {
    let delta = new as i64 - old as i64;
    format!("{} ({}%)", format_signed_bytes(delta), format_percent(old, new))
}
