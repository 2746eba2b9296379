//! # Seed Data Generator
//!
//! Populates the database with a demo business for development.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database
//! cargo run -p paymate-db --bin seed
//!
//! # Specify database path and owner
//! cargo run -p paymate-db --bin seed -- --db ./data/paymate.db --owner demo-studio
//! ```
//!
//! ## Generated Records
//! - One owner profile with payment defaults
//! - A small team with salary structures
//! - Catalog entries across service categories
//! - Invoices built from the catalog, the first one paid
//! - Approved leave and a few operating expenses

use chrono::{Datelike, Duration, Local, NaiveDate};
use std::env;
use std::path::PathBuf;

use paymate_core::invoice::{CatalogItem, DiscountType, PaymentDetails};
use paymate_core::leave::{LeaveRequest, LeaveStatus};
use paymate_core::ledger::{PaymentMode, Transaction, TransactionKind};
use paymate_core::payroll::SalaryStructure;
use paymate_core::types::{EnterpriseRole, MemberStatus, TeamMember};
use paymate_db::{init_tracing, AppConfig, Repositories};

/// (name, role, basic, hra)
const TEAM: &[(&str, &str, f64, f64)] = &[
    ("Asha Verma", "Designer", 30000.0, 12000.0),
    ("Ravi Kumar", "Engineer", 45000.0, 18000.0),
    ("Meera Nair", "Engineer", 40000.0, 16000.0),
    ("Kiran Rao", "Accountant", 25000.0, 10000.0),
    ("Dev Patel", "Intern", 12000.0, 0.0),
];

/// (name, category, rate, tax rate)
const CATALOG: &[(&str, &str, f64, f64)] = &[
    ("Logo Design", "Design", 15000.0, 18.0),
    ("Brand Guidelines", "Design", 25000.0, 18.0),
    ("Landing Page", "Development", 40000.0, 18.0),
    ("Maintenance Hour", "Development", 1500.0, 18.0),
    ("SEO Audit", "Marketing", 12000.0, 18.0),
    ("Social Media Month", "Marketing", 20000.0, 5.0),
];

/// (client, catalog rows as (index, quantity))
const INVOICES: &[(&str, &[(usize, f64)])] = &[
    ("Globex Retail", &[(0, 1.0), (1, 1.0)]),
    ("Initech Labs", &[(2, 1.0), (3, 12.0)]),
    ("Umbrella Foods", &[(4, 1.0), (5, 3.0)]),
];

/// (category, amount, description)
const EXPENSES: &[(&str, f64, &str)] = &[
    ("Rent", 35000.0, "Office rent"),
    ("Utilities", 4200.0, "Electricity and internet"),
    ("Software", 6800.0, "Design tool subscriptions"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut owner = String::from("demo-studio");

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
            "--help" | "-h" => {
                println!("PayMate Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("  -o, --owner <ID>     Owner profile id (default: demo-studio)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = AppConfig::load_or_default(None);
    if let Some(path) = db_path {
        config.database.path = path;
    }

    println!("🌱 PayMate Seed Data Generator");
    println!("==============================");
    println!("Backend:  {}", config.database.backend);
    println!("Database: {}", config.database.path.display());
    println!("Owner:    {}", owner);
    println!();

    let repos = config.open().await?;
    println!("✓ Connected to database");

    if repos.profiles().get(&owner).await?.is_some() {
        println!("⚠ Profile '{}' already exists", owner);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let start = std::time::Instant::now();

    seed_profile(&repos, &owner, config.currency()).await?;
    println!("✓ Created owner profile");

    let members = seed_team(&repos, &owner).await?;
    println!("✓ Added {} team members", members.len());

    let catalog = seed_catalog(&repos, &owner).await?;
    println!("✓ Added {} catalog items", catalog.len());

    let invoiced = seed_invoices(&repos, &owner, &catalog, today).await?;
    println!("✓ Created {} invoices", invoiced);

    seed_leave(&repos, &owner, &members, today).await?;
    println!("✓ Approved leave for {}", members[0].name);

    for (category, amount, description) in EXPENSES {
        let tx = Transaction::new(TransactionKind::Expense, *amount, today, *category, owner.as_str())
            .with_payment_mode(PaymentMode::BankTransfer)
            .with_description(*description)
            .with_currency(Some(config.currency().to_string()));
        repos.ledger().add(&tx).await?;
    }
    println!("✓ Booked {} expenses", EXPENSES.len());

    let summary = repos.ledger().summary(&owner).await?;
    println!();
    println!("Ledger:");
    println!("  Income:   {:.2}", summary.total_income);
    println!("  Expenses: {:.2}", summary.total_expense);
    println!("  Balance:  {:.2}", summary.balance);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

async fn seed_profile(
    repos: &Repositories,
    owner: &str,
    currency: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = repos.profiles();
    let mut profile = profiles
        .ensure(owner, Some("Demo Studio"), Some("hello@demo.studio"))
        .await?;
    profile.company = "Demo Studio LLP".to_string();
    profile.designation = "Founder".to_string();
    profile.default_currency = Some(currency.to_string());
    profile.default_payment = Some(PaymentDetails {
        bank_name: "State Bank of India".to_string(),
        account_holder: "Demo Studio LLP".to_string(),
        account_number: "0012345678".to_string(),
        ifsc_code: "SBIN0000123".to_string(),
        upi_id: "demostudio@sbi".to_string(),
    });
    profiles.save(&profile).await?;
    Ok(())
}

async fn seed_team(
    repos: &Repositories,
    owner: &str,
) -> Result<Vec<TeamMember>, Box<dyn std::error::Error>> {
    let team = repos.team();
    let mut members = Vec::with_capacity(TEAM.len());

    for (idx, (name, role, basic, hra)) in TEAM.iter().enumerate() {
        let handle = name.split(' ').next().unwrap_or(*name).to_lowercase();
        let member = TeamMember {
            id: format!("{}-member-{:02}", owner, idx + 1),
            name: name.to_string(),
            role: role.to_string(),
            email: format!("{}@demo.studio", handle),
            enterprise_role: if idx == 0 {
                EnterpriseRole::Manager
            } else {
                EnterpriseRole::Staff
            },
            status: MemberStatus::Active,
            enterprise_id: owner.to_string(),
            salary_structure: Some(SalaryStructure {
                basic: *basic,
                hra: *hra,
                ..SalaryStructure::default()
            }),
        };
        team.put(&member).await?;
        members.push(member);
    }

    Ok(members)
}

async fn seed_catalog(
    repos: &Repositories,
    owner: &str,
) -> Result<Vec<CatalogItem>, Box<dyn std::error::Error>> {
    let catalog = repos.catalog();
    let mut items = Vec::with_capacity(CATALOG.len());

    for (idx, (name, category, rate, tax_rate)) in CATALOG.iter().enumerate() {
        let item = CatalogItem {
            id: format!("{}-catalog-{:02}", owner, idx + 1),
            name: name.to_string(),
            category: category.to_string(),
            default_rate: *rate,
            default_tax_rate: *tax_rate,
            default_discount_value: 0.0,
            default_discount_type: DiscountType::Percent,
            default_hsn_code: Some(format!("99{:04}", 8300 + idx)),
            enterprise_id: owner.to_string(),
        };
        catalog.put(&item).await?;
        items.push(item);
    }

    Ok(items)
}

async fn seed_invoices(
    repos: &Repositories,
    owner: &str,
    catalog: &[CatalogItem],
    today: NaiveDate,
) -> Result<usize, Box<dyn std::error::Error>> {
    let invoices = repos.invoices();

    for (idx, (client, rows)) in INVOICES.iter().enumerate() {
        let issued = today - Duration::days(10 * (INVOICES.len() - idx) as i64);
        let mut draft = invoices.create_draft(owner, issued).await?;
        draft.client_name = client.to_string();

        let blank = draft.items[0].id.clone();
        draft.remove_item(&blank)?;
        for (catalog_idx, quantity) in rows.iter() {
            let row = draft.add_catalog_item(&catalog[*catalog_idx]);
            draft.update_item(&row, |item| item.quantity = *quantity)?;
        }
        invoices.save_validated(&mut draft).await?;

        if idx == 0 {
            invoices.mark_paid(&draft.id, today).await?;
        }
    }

    Ok(INVOICES.len())
}

async fn seed_leave(
    repos: &Repositories,
    owner: &str,
    members: &[TeamMember],
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let leave = repos.leave();
    let month_start = today.with_day(1).unwrap_or(today);

    let request = LeaveRequest::new(
        members[0].id.as_str(),
        owner,
        "Casual Leave (CL)",
        month_start,
        month_start + Duration::days(1),
        "Family function",
    )?;
    let submitted = leave.submit(request).await?;
    leave.set_status(&submitted.id, LeaveStatus::Approved).await?;
    Ok(())
}
