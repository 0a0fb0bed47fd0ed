//! CLI command handlers.

use anyhow::Result;
use console::{Style, style};
use ledgerdesk_client::ApiClient;
use ledgerdesk_config::ClientConfig;
use serde::Serialize;

pub mod auth;
pub mod clients;
pub mod config;
pub mod licenses;
pub mod obligations;
pub mod portal;
pub mod reports;
pub mod transactions;
pub mod users;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration with overrides applied.
    pub config: ClientConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build an API client sharing the on-disk token file.
    pub fn client(&self) -> Result<ApiClient> {
        let client = self.config.client_builder()?.build()?;
        if self.verbose {
            let dim = Style::new().dim();
            eprintln!("{}", dim.apply_to(format!("API: {}", client.base_url())));
        }
        Ok(client)
    }

    /// Today in local time, used for due-date arithmetic.
    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Local::now().date_naive()
    }

    /// Print `value` as pretty JSON when `--json` is set.
    ///
    /// Returns true if it printed, so callers can skip human output.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<bool> {
        if self.json_output {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(self.json_output)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Bold title followed by a separator line.
pub fn print_header(title: &str) {
    let dim = Style::new().dim();
    println!("{}", style(title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
}

/// Green check mark with a message.
pub fn print_success(message: &str) {
    let green = Style::new().green();
    println!("{} {}", green.apply_to("✓"), message);
}

/// Dimmed line for empty results and footnotes.
pub fn print_dim(message: &str) {
    let dim = Style::new().dim();
    println!("{}", dim.apply_to(message));
}

/// Footer noting how much of a paginated list was shown.
pub fn print_page_footer<T>(page: &ledgerdesk_client::Page<T>) {
    if page.page_count() > 1 {
        println!();
        print_dim(&format!(
            "Page {} of {} ({} total)",
            page.page,
            page.page_count(),
            page.total
        ));
    }
}

/// Render cents as a decimal amount, e.g. `-1234` -> `-12.34`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a decimal amount like `150`, `150.5` or `150.25` into cents.
pub fn parse_cents(input: &str) -> std::result::Result<i64, String> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() || fraction.len() > 2 {
        return Err(format!("invalid amount '{}': use up to two decimals", input));
    }

    let whole: i64 = whole
        .parse()
        .map_err(|_| format!("invalid amount '{}'", input))?;
    let fraction: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<2}", fraction)
            .parse()
            .map_err(|_| format!("invalid amount '{}'", input))?
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(|| format!("amount '{}' is too large", input))?;
    Ok(if negative { -cents } else { cents })
}

/// Shorten text to `max` characters with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(123_456), "1234.56");
        assert_eq!(format_cents(-1_234), "-12.34");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("150"), Ok(15_000));
        assert_eq!(parse_cents("150.5"), Ok(15_050));
        assert_eq!(parse_cents("150.25"), Ok(15_025));
        assert_eq!(parse_cents("-0.99"), Ok(-99));
        assert!(parse_cents("1.234").is_err());
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents(".5").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Acme Holdings Limited", 10), "Acme Hold…");
    }
}
