//! # Payroll Runner
//!
//! Processes one month's payroll for every active team member of an owner.
//!
//! ## Usage
//! ```bash
//! # Current month for the demo owner
//! cargo run -p paymate-db --bin payroll
//!
//! # A specific month
//! cargo run -p paymate-db --bin payroll -- --owner demo-studio --year 2024 --month 6
//! ```

use chrono::{Local, NaiveDate};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use paymate_core::currency::format_amount;
use paymate_core::payroll::PayPeriod;
use paymate_core::types::MemberStatus;
use paymate_db::{init_tracing, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let today = Local::now().date_naive();
    let current = PayPeriod::containing(today);

    let mut db_path: Option<PathBuf> = None;
    let mut owner = String::from("demo-studio");
    let mut year = current.year();
    let mut month = current.month();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner = args[i + 1].clone();
                    i += 1;
                }
            }
            "--year" | "-y" => {
                if i + 1 < args.len() {
                    year = parse_flag("--year", &args[i + 1])?;
                    i += 1;
                }
            }
            "--month" | "-m" => {
                if i + 1 < args.len() {
                    month = parse_flag("--month", &args[i + 1])?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PayMate Payroll Runner");
                println!();
                println!("Usage: payroll [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("  -o, --owner <ID>     Owner id (default: demo-studio)");
                println!("  -y, --year <YYYY>    Year (default: current)");
                println!("  -m, --month <1-12>   Month (default: current)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let period = PayPeriod::new(year, month)?;

    let mut config = AppConfig::load_or_default(None);
    if let Some(path) = db_path {
        config.database.path = path;
    }

    let repos = config.open().await?;

    let currency = repos
        .profiles()
        .get(&owner)
        .await?
        .and_then(|profile| profile.default_currency)
        .unwrap_or_else(|| config.currency().to_string());

    let members: Vec<_> = repos
        .team()
        .list(&owner)
        .await?
        .into_iter()
        .filter(|member| member.status == MemberStatus::Active)
        .collect();

    println!("💸 Payroll for {} ({})", period, owner);
    println!("==============================");

    if members.is_empty() {
        println!("⚠ No active team members");
        return Ok(());
    }

    let paid_on = last_day(period);
    let runs = repos
        .payroll()
        .process_all(&members, period, paid_on, Some(currency.clone()))
        .await?;

    for run in &runs {
        let slip = &run.payslip;
        println!(
            "  {:<20} paid {:>2}/{:<2} days  LOP {:>2}  net {:>14}{}",
            slip.member_name,
            slip.paid_days,
            slip.working_days,
            slip.lop_days,
            format_amount(slip.net_pay, Some(&currency)),
            if run.replaced { "  (replaced)" } else { "" }
        );
    }

    let total = repos.payroll().monthly_payout(&owner, period).await?;
    println!();
    println!("✓ Processed {} payslips", runs.len());
    println!("  Monthly payout: {}", format_amount(total, Some(&currency)));

    Ok(())
}

/// Parses a flag value, naming the flag when it is not a number.
fn parse_flag<T: FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value for {}: '{}'", flag, value))
}

/// Payouts are dated the last day of the month.
fn last_day(period: PayPeriod) -> NaiveDate {
    let first = period.first_day();
    first + chrono::Duration::days(i64::from(period.days_in_month()) - 1)
}
