// ⚖️ Balance Calculator - Rent arrears / credit per tenant
//
// For a tenant holding a room:
//
//   months_elapsed = (Δyears × 12) + Δmonths + 1      (min 1)
//   expected_rent  = months_elapsed × monthly_rent
//   total_paid     = Σ payments of the tenant
//   balance        = expected_rent − total_paid
//
//   balance > 0 → arrears (tenant owes)
//   balance < 0 → credit  (tenant overpaid)
//
// The "+1" is added whether or not the billing day of the current month
// has been reached. That matches the figures managers already see, so it
// stays until the billing rule is settled.
//
// Pure functions: `today` is always passed in.

use crate::entities::{Payment, Room, Tenant};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// BALANCE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    /// Tenant holds a room and has a usable moving-in date
    Computed,

    /// Tenant holds no room - nothing is billed
    NoRoom,

    /// Tenant holds a room but the moving-in date is missing or invalid
    InvalidMoveIn,
}

// ============================================================================
// TENANT BALANCE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantBalance {
    pub tenant_id: i64,
    pub tenant_name: String,

    /// Room id and display label (None when no room is assigned)
    pub room_id: Option<i64>,
    pub room_number: Option<String>,

    pub monthly_rent: f64,
    pub months_elapsed: u32,
    pub expected_rent: f64,
    pub total_paid: f64,

    /// expected_rent - total_paid
    pub balance: f64,

    /// max(balance, 0)
    pub arrears: f64,

    /// max(-balance, 0)
    pub credit: f64,

    pub status: BalanceStatus,
}

impl TenantBalance {
    fn neutral(tenant: &Tenant, room: Option<&Room>, total_paid: f64, status: BalanceStatus) -> Self {
        TenantBalance {
            tenant_id: tenant.id,
            tenant_name: tenant.name.clone(),
            room_id: room.map(|r| r.id),
            room_number: room.map(|r| r.room_number.clone()),
            monthly_rent: room.map(|r| r.rent_amount).unwrap_or(0.0),
            months_elapsed: 0,
            expected_rent: 0.0,
            total_paid,
            balance: 0.0,
            arrears: 0.0,
            credit: 0.0,
            status,
        }
    }

    pub fn has_room(&self) -> bool {
        self.room_id.is_some()
    }

    pub fn in_arrears(&self) -> bool {
        self.arrears > 0.0
    }

    pub fn in_credit(&self) -> bool {
        self.credit > 0.0
    }

    pub fn summary(&self) -> String {
        match self.status {
            BalanceStatus::NoRoom => format!("{}: no room assigned", self.tenant_name),
            BalanceStatus::InvalidMoveIn => format!(
                "{} (room {}): moving-in date unknown, balance not computed",
                self.tenant_name,
                self.room_number.as_deref().unwrap_or("?")
            ),
            BalanceStatus::Computed => format!(
                "{} (room {}): {} months × {:.2} = {:.2} expected, {:.2} paid, balance {:.2}",
                self.tenant_name,
                self.room_number.as_deref().unwrap_or("?"),
                self.months_elapsed,
                self.monthly_rent,
                self.expected_rent,
                self.total_paid,
                self.balance
            ),
        }
    }
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Rent periods billed between `moving_in` and `today`, inclusive of the
/// current month. Never less than 1.
pub fn months_elapsed(moving_in: NaiveDate, today: NaiveDate) -> u32 {
    let years = today.year() - moving_in.year();
    let months = today.month() as i32 - moving_in.month() as i32;

    // Both sides of the billing-day comparison add one period.
    let elapsed = years * 12 + months + 1;

    elapsed.max(1) as u32
}

/// Total paid by one tenant across the given payments
pub fn total_paid_by(tenant_id: i64, payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|p| p.tenant_id == tenant_id)
        .map(|p| p.payment_price)
        .sum()
}

/// Compute one tenant's balance.
///
/// `room` is the room currently held by the tenant; `payments` may be the
/// full history (it is filtered by tenant id here).
///
/// Example:
/// ```
/// use serene_manager::balance::{compute_tenant_balance, BalanceStatus};
/// use serene_manager::entities::{Room, RoomStatus, Tenant};
/// use chrono::NaiveDate;
///
/// let tenant = Tenant {
///     id: 1,
///     name: "Amina".to_string(),
///     email: "amina@example.com".to_string(),
///     phone: "0700000001".to_string(),
///     moving_in_date: NaiveDate::from_ymd_opt(2025, 1, 10),
/// };
/// let room = Room {
///     id: 4,
///     room_number: "A-4".to_string(),
///     status: RoomStatus::Occupied,
///     rent_amount: 10000.0,
///     room_type: "single".to_string(),
///     tenant_id: Some(1),
/// };
/// let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
///
/// let b = compute_tenant_balance(&tenant, Some(&room), &[], today);
/// assert_eq!(b.status, BalanceStatus::Computed);
/// assert_eq!(b.arrears, 10000.0);
/// ```
pub fn compute_tenant_balance(
    tenant: &Tenant,
    room: Option<&Room>,
    payments: &[Payment],
    today: NaiveDate,
) -> TenantBalance {
    let room = match room {
        Some(r) => r,
        None => return TenantBalance::neutral(tenant, None, 0.0, BalanceStatus::NoRoom),
    };

    let total_paid = total_paid_by(tenant.id, payments);

    let moving_in = match tenant.moving_in_date {
        Some(d) => d,
        None => {
            tracing::warn!(
                tenant_id = tenant.id,
                "tenant has no usable moving-in date; balance not computed"
            );
            return TenantBalance::neutral(tenant, Some(room), total_paid, BalanceStatus::InvalidMoveIn);
        }
    };

    let months = months_elapsed(moving_in, today);
    let monthly_rent = room.rent_amount;
    let expected_rent = months as f64 * monthly_rent;
    let balance = expected_rent - total_paid;

    TenantBalance {
        tenant_id: tenant.id,
        tenant_name: tenant.name.clone(),
        room_id: Some(room.id),
        room_number: Some(room.room_number.clone()),
        monthly_rent,
        months_elapsed: months,
        expected_rent,
        total_paid,
        balance,
        arrears: if balance > 0.0 { balance } else { 0.0 },
        credit: if balance < 0.0 { balance.abs() } else { 0.0 },
        status: BalanceStatus::Computed,
    }
}

/// The room currently held by `tenant_id`
pub fn room_of<'a>(tenant_id: i64, rooms: &'a [Room]) -> Option<&'a Room> {
    rooms.iter().find(|r| r.is_held_by(tenant_id))
}

/// Balances for every tenant, in tenant order
pub fn compute_balances(
    tenants: &[Tenant],
    rooms: &[Room],
    payments: &[Payment],
    today: NaiveDate,
) -> Vec<TenantBalance> {
    tenants
        .iter()
        .map(|t| compute_tenant_balance(t, room_of(t.id, rooms), payments, today))
        .collect()
}

/// Only tenants currently holding a room
pub fn active_balances(balances: &[TenantBalance]) -> Vec<&TenantBalance> {
    balances.iter().filter(|b| b.has_room()).collect()
}

/// Amount to prefill when recording a payment: the tenant's monthly rent
pub fn suggested_payment(tenant_id: i64, rooms: &[Room]) -> Option<f64> {
    room_of(tenant_id, rooms).map(|r| r.rent_amount)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RoomStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tenant(id: i64, moving_in: Option<NaiveDate>) -> Tenant {
        Tenant {
            id,
            name: format!("Tenant {}", id),
            email: format!("t{}@example.com", id),
            phone: "0700000000".to_string(),
            moving_in_date: moving_in,
        }
    }

    fn room(id: i64, rent: f64, tenant_id: Option<i64>) -> Room {
        Room {
            id,
            room_number: format!("A-{}", id),
            status: if tenant_id.is_some() { RoomStatus::Occupied } else { RoomStatus::Vacant },
            rent_amount: rent,
            room_type: "single".to_string(),
            tenant_id,
        }
    }

    fn payment(id: i64, tenant_id: i64, amount: f64, on: NaiveDate) -> Payment {
        Payment {
            id,
            tenant_id,
            room_id: None,
            payment_price: amount,
            payment_date: Some(on),
        }
    }

    #[test]
    fn test_no_room_is_zero() {
        let t = tenant(1, Some(date(2024, 1, 1)));
        let payments = vec![payment(1, 1, 5000.0, date(2024, 2, 1))];

        let b = compute_tenant_balance(&t, None, &payments, date(2025, 3, 15));

        assert_eq!(b.status, BalanceStatus::NoRoom);
        assert_eq!(b.balance, 0.0);
        assert_eq!(b.expected_rent, 0.0);
        assert_eq!(b.total_paid, 0.0);
        assert_eq!(b.room_id, None);
        assert_eq!(b.room_number, None);
    }

    #[test]
    fn test_three_full_months_counts_four_periods() {
        let t = tenant(1, Some(date(2025, 1, 15)));
        let r = room(1, 10000.0, Some(1));

        let b = compute_tenant_balance(&t, Some(&r), &[], date(2025, 4, 15));

        assert_eq!(b.months_elapsed, 4);
        assert_eq!(b.expected_rent, 40000.0);
        assert_eq!(b.arrears, 40000.0);
        assert_eq!(b.credit, 0.0);

        println!("✅ Test passed: {}", b.summary());
    }

    #[test]
    fn test_increment_ignores_billing_day() {
        // Billing day (20th) not reached yet on the 5th: still +1
        let before_day = months_elapsed(date(2025, 1, 20), date(2025, 3, 5));
        // Billing day passed
        let after_day = months_elapsed(date(2025, 1, 20), date(2025, 3, 25));

        assert_eq!(before_day, 3);
        assert_eq!(after_day, 3);
    }

    #[test]
    fn test_months_elapsed_across_years_and_clamp() {
        assert_eq!(months_elapsed(date(2024, 11, 1), date(2025, 2, 1)), 4);
        assert_eq!(months_elapsed(date(2025, 6, 1), date(2025, 6, 30)), 1);

        // Moving in later than today still bills one period
        assert_eq!(months_elapsed(date(2025, 9, 1), date(2025, 6, 1)), 1);
        assert_eq!(months_elapsed(date(2026, 1, 1), date(2025, 6, 1)), 1);
    }

    #[test]
    fn test_overpayment_is_credit() {
        let today = date(2025, 5, 20);
        let t = tenant(2, Some(date(2025, 5, 1)));
        let r = room(2, 10000.0, Some(2));
        let payments = vec![payment(1, 2, 15000.0, date(2025, 5, 2))];

        let b = compute_tenant_balance(&t, Some(&r), &payments, today);

        assert_eq!(b.months_elapsed, 1);
        assert_eq!(b.balance, -5000.0);
        assert_eq!(b.credit, 5000.0);
        assert_eq!(b.arrears, 0.0);
        assert!(b.in_credit());
        assert!(!b.in_arrears());
    }

    #[test]
    fn test_exact_payment_is_neither() {
        let today = date(2025, 5, 20);
        let t = tenant(2, Some(date(2025, 4, 1)));
        let r = room(2, 8000.0, Some(2));
        let payments = vec![
            payment(1, 2, 8000.0, date(2025, 4, 2)),
            payment(2, 2, 8000.0, date(2025, 5, 2)),
        ];

        let b = compute_tenant_balance(&t, Some(&r), &payments, today);

        assert_eq!(b.balance, 0.0);
        assert_eq!(b.arrears, 0.0);
        assert_eq!(b.credit, 0.0);
    }

    #[test]
    fn test_other_tenants_payments_are_ignored() {
        let today = date(2025, 5, 20);
        let t = tenant(1, Some(date(2025, 5, 1)));
        let r = room(1, 10000.0, Some(1));
        let payments = vec![
            payment(1, 1, 4000.0, date(2025, 5, 2)),
            payment(2, 9, 99999.0, date(2025, 5, 2)),
        ];

        let b = compute_tenant_balance(&t, Some(&r), &payments, today);

        assert_eq!(b.total_paid, 4000.0);
        assert_eq!(b.arrears, 6000.0);
    }

    #[test]
    fn test_invalid_moving_in_date_reports_zero() {
        let t = tenant(3, None);
        let r = room(3, 10000.0, Some(3));
        let payments = vec![payment(1, 3, 2500.0, date(2025, 5, 2))];

        let b = compute_tenant_balance(&t, Some(&r), &payments, date(2025, 6, 1));

        assert_eq!(b.status, BalanceStatus::InvalidMoveIn);
        assert_eq!(b.balance, 0.0);
        assert_eq!(b.expected_rent, 0.0);
        assert_eq!(b.arrears, 0.0);
        assert_eq!(b.credit, 0.0);
        assert_eq!(b.total_paid, 2500.0);
        assert_eq!(b.room_number.as_deref(), Some("A-3"));
    }

    #[test]
    fn test_idempotent() {
        let today = date(2025, 7, 4);
        let tenants = vec![tenant(1, Some(date(2025, 1, 1))), tenant(2, Some(date(2025, 3, 9)))];
        let rooms = vec![room(1, 9000.0, Some(1)), room(2, 12000.0, Some(2)), room(3, 7000.0, None)];
        let payments = vec![
            payment(1, 1, 9000.0, date(2025, 1, 3)),
            payment(2, 2, 30000.0, date(2025, 3, 10)),
        ];

        let first = compute_balances(&tenants, &rooms, &payments, today);
        let second = compute_balances(&tenants, &rooms, &payments, today);

        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_balances_uses_room_side_assignment() {
        let today = date(2025, 7, 4);
        let tenants = vec![tenant(1, Some(date(2025, 7, 1))), tenant(2, Some(date(2025, 7, 1)))];
        let rooms = vec![room(10, 5000.0, Some(2))];

        let balances = compute_balances(&tenants, &rooms, &[], today);

        assert_eq!(balances[0].status, BalanceStatus::NoRoom);
        assert_eq!(balances[1].room_id, Some(10));
        assert_eq!(balances[1].arrears, 5000.0);

        let active = active_balances(&balances);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].tenant_id, 2);
    }

    #[test]
    fn test_suggested_payment_is_monthly_rent() {
        let rooms = vec![room(1, 9000.0, Some(1)), room(2, 12000.0, None)];

        assert_eq!(suggested_payment(1, &rooms), Some(9000.0));
        assert_eq!(suggested_payment(2, &rooms), None);
    }
}
