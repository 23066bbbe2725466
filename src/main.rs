// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use serene_manager::balance::{room_of, suggested_payment};
use serene_manager::parse::{parse_amount_str, parse_date};
use serene_manager::report::{export_dir, format_balance, format_currency};
use serene_manager::{
    logging, AppState, Config, Mutation, NewPayment, NewRoom, NewTenant, PaymentPatch, RemoteApi,
    RoomStatus, TenantPatch,
};

/// Serene Manager - rooms, tenants and rent balances from the terminal
#[derive(Parser, Debug)]
#[command(name = "serene", author, version, about, long_about = None)]
struct Cli {
    /// Remote API base URL (overrides config and SERENE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Manager email
    #[arg(long, global = true)]
    email: Option<String>,

    /// Manager password (prefer SERENE_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Use an existing session token instead of logging in
    #[arg(long, global = true, env = "SERENE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive dashboard (default)
    Dashboard,
    /// Rent balance per tenant
    Balances {
        /// Include tenants without a room
        #[arg(long)]
        all: bool,
    },
    /// Collections, arrears, credit and occupancy
    Summary,
    /// List rooms
    Rooms,
    /// List tenants
    Tenants,
    /// Payment history, newest first
    Payments,
    /// Write balances.csv and payments.csv
    Export {
        #[arg(default_value = "export")]
        dir: PathBuf,
    },
    /// Add a room
    AddRoom {
        /// Display label, e.g. A-12
        number: String,
        /// Monthly rent
        #[arg(value_parser = non_negative_amount)]
        rent: f64,
        #[arg(long = "type", default_value = "single")]
        room_type: String,
    },
    /// Assign a tenant to a room
    Assign { room: i64, tenant: i64 },
    /// Vacate a room
    Vacate { room: i64 },
    /// Set a room's status (vacant, occupied, maintenance)
    SetStatus {
        room: i64,
        #[arg(value_parser = room_status)]
        status: RoomStatus,
    },
    /// Delete a room (must be vacant)
    DeleteRoom { room: i64 },
    /// Add a tenant (moving-in date is set by the server)
    AddTenant {
        name: String,
        email: String,
        phone: String,
    },
    /// Change a tenant's contact details
    UpdateTenant {
        tenant: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a tenant (frees their room)
    DeleteTenant { tenant: i64 },
    /// Record a payment (amount defaults to the tenant's monthly rent)
    RecordPayment {
        tenant: i64,
        #[arg(long, value_parser = non_negative_amount)]
        amount: Option<f64>,
        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },
    /// Correct a payment's amount
    UpdatePayment {
        payment: i64,
        #[arg(value_parser = non_negative_amount)]
        amount: f64,
    },
}

fn non_negative_amount(s: &str) -> std::result::Result<f64, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("amount is required".to_string());
    }
    let amount = parse_amount_str(trimmed);
    if amount == 0.0 && trimmed.trim_start_matches(['0', '.']).chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("'{}' is not a number", s));
    }
    if amount < 0.0 {
        return Err("amount must not be negative".to_string());
    }
    Ok(amount)
}

fn room_status(s: &str) -> std::result::Result<RoomStatus, String> {
    RoomStatus::parse(s).ok_or_else(|| format!("unknown status '{}' (vacant, occupied, maintenance)", s))
}

fn date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("'{}' is not a date (YYYY-MM-DD)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url.clone() {
        config.api.url = url;
    }
    if let Some(email) = cli.email.clone() {
        config.api.email = Some(email);
    }
    if let Some(password) = cli.password.clone() {
        config.api.password = Some(password);
    }

    let command = cli.command.unwrap_or(Command::Dashboard);

    if matches!(command, Command::Dashboard) {
        let log_path = Config::config_dir()?.join("serene.log");
        logging::init_to_file(cli.verbose, &log_path)?;
    } else {
        logging::init(cli.verbose);
    }

    let api = connect(&config, cli.token).await?;
    let currency = config.display.currency.clone();

    match command {
        Command::Dashboard => run_dashboard(api, &currency).await,
        Command::Balances { all } => show_balances(&api, &currency, all).await,
        Command::Summary => show_summary(&api, &currency).await,
        Command::Rooms => show_rooms(&api, &currency).await,
        Command::Tenants => show_tenants(&api).await,
        Command::Payments => show_payments(&api, &currency).await,
        Command::Export { dir } => run_export(&api, &dir).await,
        Command::AddRoom { number, rent, room_type } => {
            let room = api.create_room(&NewRoom::new(number, room_type, rent)).await?;
            println!("✓ Room {} added (id {}, {})", room.room_number, room.id, format_currency(&currency, room.rent_amount));
            Ok(())
        }
        Command::Assign { room, tenant } => {
            let state = api.load_all().await?;
            if state.tenant(tenant).is_none() {
                bail!("No tenant with id {}", tenant);
            }
            if !state.unassigned_tenants().iter().any(|t| t.id == tenant) {
                let held = state.room_of_tenant(tenant).map(|r| r.room_number.as_str()).unwrap_or("?");
                bail!("Tenant {} already holds room {}", tenant, held);
            }
            if let Some(current) = state.room(room) {
                if current.is_occupied() || current.status == RoomStatus::Maintenance {
                    bail!("Room {} is {}; vacate it first", current.room_number, current.status);
                }
            }
            let updated = api.assign_tenant(room, tenant).await?;
            let state = state.apply(Mutation::RoomUpdated(updated));
            print_room_line(&state, room, &currency);
            Ok(())
        }
        Command::Vacate { room } => {
            let state = api.load_all().await?;
            let updated = api.vacate_room(room).await?;
            let state = state.apply(Mutation::RoomUpdated(updated));
            print_room_line(&state, room, &currency);
            Ok(())
        }
        Command::SetStatus { room, status } => {
            let state = api.load_all().await?;
            let current = state
                .room(room)
                .cloned()
                .with_context(|| format!("No room with id {}", room))?;
            let updated = api.set_room_status(&current, status).await?;
            let state = state.apply(Mutation::RoomUpdated(updated));
            print_room_line(&state, room, &currency);
            Ok(())
        }
        Command::DeleteRoom { room } => {
            let state = api.load_all().await?;
            if state.room(room).is_none() {
                bail!("No room with id {}", room);
            }
            if !state.can_delete_room(room) {
                bail!("Room {} has an active tenant; vacate it first", room);
            }
            api.delete_room(room).await?;
            let state = state.apply(Mutation::RoomDeleted(room));
            println!("✓ Room {} deleted ({} rooms left)", room, state.rooms.len());
            Ok(())
        }
        Command::AddTenant { name, email, phone } => {
            let tenant = api.create_tenant(&NewTenant { name, email, phone }).await?;
            println!(
                "✓ Tenant {} added (id {}, moving in {})",
                tenant.name,
                tenant.id,
                tenant.moving_in_date.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string())
            );
            Ok(())
        }
        Command::UpdateTenant { tenant, name, email, phone } => {
            let patch = TenantPatch { name, email, phone };
            if patch.is_empty() {
                bail!("Nothing to update: pass --name, --email or --phone");
            }
            let state = api.load_all().await?;
            api.update_tenant(tenant, &patch).await?;
            let state = state.apply(Mutation::TenantsReloaded(api.list_tenants().await?));
            match state.tenant(tenant) {
                Some(t) => println!("✓ Tenant {}: {} <{}> {}", t.id, t.name, t.email, t.phone),
                None => println!("✓ Tenant {} updated", tenant),
            }
            Ok(())
        }
        Command::DeleteTenant { tenant } => {
            let state = api.load_all().await?;
            let freed = state.room_of_tenant(tenant).map(|r| r.room_number.clone());
            api.delete_tenant(tenant).await?;
            let state = state.apply(Mutation::TenantDeleted(tenant));
            match freed {
                Some(room) => println!("✓ Tenant {} deleted, room {} is vacant", tenant, room),
                None => println!("✓ Tenant {} deleted ({} tenants left)", tenant, state.tenants.len()),
            }
            Ok(())
        }
        Command::RecordPayment { tenant, amount, date } => {
            record_payment(&api, &currency, tenant, amount, date).await
        }
        Command::UpdatePayment { payment, amount } => {
            let state = api.load_all().await?;
            let updated = api.update_payment(payment, &PaymentPatch { amount }).await?;
            let tenant_id = updated.tenant_id;
            let state = state.apply(Mutation::PaymentUpdated(updated));
            println!("✓ Payment {} now {}", payment, format_currency(&currency, amount));
            print_tenant_balance(&state, tenant_id, &currency);
            Ok(())
        }
    }
}

/// Log in (or reuse a token) and return a ready client.
async fn connect(config: &Config, token: Option<String>) -> Result<RemoteApi> {
    let api = RemoteApi::new(config.api.url.clone(), config.api.timeout())?;

    if let Some(token) = token {
        return Ok(api.with_token(token));
    }

    let (email, password) = config.api.credentials().context(
        "No credentials: set SERENE_EMAIL and SERENE_PASSWORD, pass --email/--password, or pass --token",
    )?;

    let mut api = api;
    api.login(email, password)
        .await
        .with_context(|| format!("Login to {} failed", config.api.url))?;
    Ok(api)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(feature = "tui")]
async fn run_dashboard(api: RemoteApi, currency: &str) -> Result<()> {
    println!("🏠 Loading Serene Manager dashboard...\n");

    let state = api.load_all().await?;
    println!("✓ Loaded {} rooms, {} tenants, {} payments\n", state.rooms.len(), state.tenants.len(), state.payments.len());

    let mut app = ui::App::new(state, currency.to_string());
    ui::run_ui(&mut app, &api).await?;

    println!("\n✅ Dashboard closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn run_dashboard(_api: RemoteApi, _currency: &str) -> Result<()> {
    eprintln!("❌ Dashboard mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: serene balances / serene summary");
    std::process::exit(1);
}

async fn show_balances(api: &RemoteApi, currency: &str, all: bool) -> Result<()> {
    let state = api.load_all().await?;
    let balances = state.balances(today());

    println!(
        "{:<24} {:<8} {:>12} {:>6} {:>14} {:>14} {:>18}",
        "Tenant", "Room", "Rent", "Months", "Expected", "Paid", "Balance"
    );
    println!("{}", "─".repeat(102));

    let mut shown = 0;
    for b in balances.iter().filter(|b| all || b.has_room()) {
        println!(
            "{:<24} {:<8} {:>12.2} {:>6} {:>14.2} {:>14.2} {:>18}",
            truncate(&b.tenant_name, 24),
            b.room_number.as_deref().unwrap_or("-"),
            b.monthly_rent,
            b.months_elapsed,
            b.expected_rent,
            b.total_paid,
            format_balance(currency, b)
        );
        shown += 1;
    }

    if shown == 0 {
        println!("No active tenants with rooms.");
    }
    Ok(())
}

async fn show_summary(api: &RemoteApi, currency: &str) -> Result<()> {
    let state = api.load_all().await?;
    let s = state.summary(today());

    println!("📊 Portfolio as of {}", s.as_of);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Total collections : {}", format_currency(currency, s.total_collections));
    println!("  This month        : {}", format_currency(currency, s.this_period_collections));
    println!("  Total arrears     : - {} ({} tenants)", format_currency(currency, s.total_arrears), s.tenants_in_arrears);
    println!("  Total credit      : + {} ({} tenants)", format_currency(currency, s.total_credit), s.tenants_in_credit);
    println!(
        "  Rooms             : {} total, {} occupied, {} vacant, {} maintenance ({:.0}% occupied)",
        s.occupancy.total,
        s.occupancy.occupied,
        s.occupancy.vacant,
        s.occupancy.maintenance,
        s.occupancy.rate()
    );

    for room in state.inconsistent_rooms() {
        println!("  ⚠️  Room {} is '{}' but tenant is {:?}", room.room_number, room.status, room.tenant_id);
    }
    Ok(())
}

async fn show_rooms(api: &RemoteApi, currency: &str) -> Result<()> {
    let state = api.load_all().await?;

    println!("{:>5} {:<10} {:<14} {:<12} {:>16} {:<24}", "Id", "Room", "Type", "Status", "Rent", "Tenant");
    for room in &state.rooms {
        let tenant = room
            .tenant_id
            .and_then(|id| state.tenant(id))
            .map(|t| t.name.as_str())
            .unwrap_or("-");
        println!(
            "{:>5} {:<10} {:<14} {:<12} {:>16} {:<24}",
            room.id,
            room.room_number,
            truncate(&room.room_type, 14),
            room.status,
            format_currency(currency, room.rent_amount),
            truncate(tenant, 24)
        );
    }
    Ok(())
}

async fn show_tenants(api: &RemoteApi) -> Result<()> {
    let state = api.load_all().await?;

    println!("{:>5} {:<24} {:<28} {:<14} {:<11} {:<8}", "Id", "Name", "Email", "Phone", "Moved in", "Room");
    for t in &state.tenants {
        println!(
            "{:>5} {:<24} {:<28} {:<14} {:<11} {:<8}",
            t.id,
            truncate(&t.name, 24),
            truncate(&t.email, 28),
            t.phone,
            t.moving_in_date.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string()),
            room_of(t.id, &state.rooms).map(|r| r.room_number.as_str()).unwrap_or("-")
        );
    }
    Ok(())
}

async fn show_payments(api: &RemoteApi, currency: &str) -> Result<()> {
    let state = api.load_all().await?;
    let rows = state.payment_history();

    if rows.is_empty() {
        println!("No payments recorded yet.");
        return Ok(());
    }

    println!("{:>5} {:<11} {:<24} {:<8} {:>16}", "Id", "Date", "Tenant", "Room", "Amount");
    for row in &rows {
        println!(
            "{:>5} {:<11} {:<24} {:<8} {:>16}",
            row.payment_id,
            row.date.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string()),
            truncate(&row.tenant_name, 24),
            row.room_number,
            format_currency(currency, row.amount)
        );
    }
    Ok(())
}

async fn run_export(api: &RemoteApi, dir: &std::path::Path) -> Result<()> {
    println!("📂 Exporting to {}...", dir.display());

    let state = api.load_all().await?;
    let (balances, payments) = export_dir(dir, &state.balances(today()), &state.payment_history())?;

    println!("✓ balances.csv: {} tenants", balances);
    println!("✓ payments.csv: {} payments", payments);
    Ok(())
}

async fn record_payment(
    api: &RemoteApi,
    currency: &str,
    tenant_id: i64,
    amount: Option<f64>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let state: AppState = api.load_all().await?;

    let tenant = state
        .tenant(tenant_id)
        .with_context(|| format!("No tenant with id {}", tenant_id))?;
    let room = state
        .room_of_tenant(tenant_id)
        .with_context(|| format!("{} has no room; assign one before recording rent", tenant.name))?;

    let amount = match amount.or_else(|| suggested_payment(tenant_id, &state.rooms)) {
        Some(a) => a,
        None => bail!("No amount given and no monthly rent to suggest"),
    };

    let request = NewPayment {
        tenant_id,
        room_id: Some(room.id),
        amount,
        payment_date: Some(date.unwrap_or_else(today)),
    };

    let (payment, room) = api.record_payment(&request).await?;
    println!("✓ Recorded {} from {} (payment {})", format_currency(currency, amount), tenant.name, payment.id);

    let state = state.apply(Mutation::PaymentAdded { payment, room });
    print_tenant_balance(&state, tenant_id, currency);
    Ok(())
}

fn print_tenant_balance(state: &AppState, tenant_id: i64, currency: &str) {
    if let Some(b) = state.balances(today()).into_iter().find(|b| b.tenant_id == tenant_id) {
        println!("  {}", b.summary());
        println!("  Balance: {}", format_balance(currency, &b));
    }
}

fn print_room_line(state: &AppState, room_id: i64, currency: &str) {
    if let Some(room) = state.room(room_id) {
        let tenant = room
            .tenant_id
            .and_then(|id| state.tenant(id))
            .map(|t| t.name.as_str())
            .unwrap_or("no tenant");
        println!(
            "✓ Room {} is {} ({}, {})",
            room.room_number,
            room.status,
            tenant,
            format_currency(currency, room.rent_amount)
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
