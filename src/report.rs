// 🧾 Reports - Money formatting and CSV export
//
// Two exports:
// - balances.csv : one row per tenant holding a room
// - payments.csv : payment history, newest first

use crate::balance::TenantBalance;
use crate::state::PaymentRow;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

// ============================================================================
// MONEY FORMATTING
// ============================================================================

/// `12345.5` → `"12,345.50"`
pub fn format_money(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, frac)
}

/// `"KSh 12,345.50"`
pub fn format_currency(currency: &str, amount: f64) -> String {
    format!("{} {}", currency, format_money(amount))
}

/// Arrears shown as `- KSh x`, credit as `+ KSh x`, settled as `KSh 0.00`
pub fn format_balance(currency: &str, balance: &TenantBalance) -> String {
    if balance.in_arrears() {
        format!("- {}", format_currency(currency, balance.arrears))
    } else if balance.in_credit() {
        format!("+ {}", format_currency(currency, balance.credit))
    } else {
        format_currency(currency, 0.0)
    }
}

// ============================================================================
// CSV EXPORT
// ============================================================================

#[derive(Serialize)]
struct BalanceRecord<'a> {
    tenant: &'a str,
    room: &'a str,
    monthly_rent: String,
    months: u32,
    expected: String,
    total_paid: String,
    arrears: String,
    credit: String,
}

#[derive(Serialize)]
struct PaymentRecord<'a> {
    id: i64,
    date: String,
    tenant: &'a str,
    room: &'a str,
    amount: String,
}

/// Write the balances of tenants holding a room as CSV.
pub fn write_balances_csv<W: Write>(writer: W, balances: &[TenantBalance]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;

    for b in balances.iter().filter(|b| b.has_room()) {
        wtr.serialize(BalanceRecord {
            tenant: &b.tenant_name,
            room: b.room_number.as_deref().unwrap_or(""),
            monthly_rent: format!("{:.2}", b.monthly_rent),
            months: b.months_elapsed,
            expected: format!("{:.2}", b.expected_rent),
            total_paid: format!("{:.2}", b.total_paid),
            arrears: format!("{:.2}", b.arrears),
            credit: format!("{:.2}", b.credit),
        })
        .context("Failed to write balance row")?;
        written += 1;
    }

    wtr.flush().context("Failed to flush balances CSV")?;
    Ok(written)
}

/// Write the payment history as CSV.
pub fn write_payments_csv<W: Write>(writer: W, rows: &[PaymentRow]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    for row in rows {
        wtr.serialize(PaymentRecord {
            id: row.payment_id,
            date: row
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            tenant: &row.tenant_name,
            room: &row.room_number,
            amount: format!("{:.2}", row.amount),
        })
        .context("Failed to write payment row")?;
    }

    wtr.flush().context("Failed to flush payments CSV")?;
    Ok(rows.len())
}

/// Write `balances.csv` and `payments.csv` into `dir`.
pub fn export_dir(dir: &Path, balances: &[TenantBalance], payments: &[PaymentRow]) -> Result<(usize, usize)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let balances_path = dir.join("balances.csv");
    let file = std::fs::File::create(&balances_path)
        .with_context(|| format!("Failed to create {}", balances_path.display()))?;
    let balance_rows = write_balances_csv(file, balances)?;

    let payments_path = dir.join("payments.csv");
    let file = std::fs::File::create(&payments_path)
        .with_context(|| format!("Failed to create {}", payments_path.display()))?;
    let payment_rows = write_payments_csv(file, payments)?;

    Ok((balance_rows, payment_rows))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::BalanceStatus;
    use chrono::NaiveDate;

    fn balance(name: &str, room: Option<&str>, arrears: f64, credit: f64) -> TenantBalance {
        TenantBalance {
            tenant_id: 1,
            tenant_name: name.to_string(),
            room_id: room.map(|_| 1),
            room_number: room.map(str::to_string),
            monthly_rent: 10000.0,
            months_elapsed: 2,
            expected_rent: 20000.0,
            total_paid: 20000.0 - arrears + credit,
            balance: arrears - credit,
            arrears,
            credit,
            status: if room.is_some() { BalanceStatus::Computed } else { BalanceStatus::NoRoom },
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(5.5), "5.50");
        assert_eq!(format_money(999.999), "1,000.00");
        assert_eq!(format_money(12345.5), "12,345.50");
        assert_eq!(format_money(1234567.891), "1,234,567.89");
        assert_eq!(format_money(-40000.0), "-40,000.00");
        assert_eq!(format_money(f64::NAN), "0.00");
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance("KSh", &balance("A", Some("A-1"), 5000.0, 0.0)), "- KSh 5,000.00");
        assert_eq!(format_balance("KSh", &balance("A", Some("A-1"), 0.0, 250.0)), "+ KSh 250.00");
        assert_eq!(format_balance("KSh", &balance("A", Some("A-1"), 0.0, 0.0)), "KSh 0.00");
    }

    #[test]
    fn test_balances_csv_skips_roomless() {
        let balances = vec![
            balance("Amina", Some("A-1"), 5000.0, 0.0),
            balance("Brian", None, 0.0, 0.0),
        ];
        let mut out = Vec::new();

        let written = write_balances_csv(&mut out, &balances).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(written, 1);
        assert!(text.starts_with("tenant,room,monthly_rent,months,expected,total_paid,arrears,credit\n"));
        assert!(text.contains("Amina,A-1,10000.00,2,20000.00,15000.00,5000.00,0.00"));
        assert!(!text.contains("Brian"));
    }

    #[test]
    fn test_export_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let rows = vec![PaymentRow {
            payment_id: 7,
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            tenant_name: "Amina".to_string(),
            room_number: "A-1".to_string(),
            amount: 10000.0,
        }];

        let (b, p) = export_dir(dir.path(), &[balance("Amina", Some("A-1"), 0.0, 0.0)], &rows).unwrap();

        assert_eq!((b, p), (1, 1));
        let payments = std::fs::read_to_string(dir.path().join("payments.csv")).unwrap();
        assert!(payments.contains("7,2025-03-01,Amina,A-1,10000.00"));
    }
}
