// 📊 Portfolio Summary - Totals across all tenants, payments and rooms
//
//   total_collections       = Σ all payments (any date)
//   this_period_collections = Σ payments dated in today's month/year
//   total_arrears           = Σ tenant arrears
//   total_credit            = Σ tenant credit

use crate::balance::TenantBalance;
use crate::entities::{Payment, Room, RoomStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub total: usize,
    pub vacant: usize,
    pub occupied: usize,
    pub maintenance: usize,
}

impl Occupancy {
    pub fn from_rooms(rooms: &[Room]) -> Self {
        let mut occupancy = Occupancy {
            total: rooms.len(),
            ..Default::default()
        };

        for room in rooms {
            match room.status {
                RoomStatus::Vacant => occupancy.vacant += 1,
                RoomStatus::Occupied => occupancy.occupied += 1,
                RoomStatus::Maintenance => occupancy.maintenance += 1,
            }
        }

        occupancy
    }

    /// Occupied rooms as a percentage of all rooms
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.occupied as f64 / self.total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub as_of: NaiveDate,
    pub total_collections: f64,
    pub this_period_collections: f64,
    pub total_arrears: f64,
    pub total_credit: f64,
    pub tenants_in_arrears: usize,
    pub tenants_in_credit: usize,
    pub occupancy: Occupancy,
}

impl PortfolioSummary {
    pub fn summary(&self) -> String {
        format!(
            "As of {}: collected {:.2} ({:.2} this month), arrears {:.2} across {} tenants, credit {:.2} across {} tenants, {}/{} rooms occupied",
            self.as_of,
            self.total_collections,
            self.this_period_collections,
            self.total_arrears,
            self.tenants_in_arrears,
            self.total_credit,
            self.tenants_in_credit,
            self.occupancy.occupied,
            self.occupancy.total
        )
    }
}

/// Sum of every payment, regardless of date
pub fn total_collections(payments: &[Payment]) -> f64 {
    payments.iter().map(|p| p.payment_price).sum()
}

/// Sum of payments dated in the calendar month and year of `today`
pub fn collections_in_period(payments: &[Payment], today: NaiveDate) -> f64 {
    payments
        .iter()
        .filter(|p| p.is_in_month_of(today))
        .map(|p| p.payment_price)
        .sum()
}

pub fn summarize(
    balances: &[TenantBalance],
    payments: &[Payment],
    rooms: &[Room],
    today: NaiveDate,
) -> PortfolioSummary {
    PortfolioSummary {
        as_of: today,
        total_collections: total_collections(payments),
        this_period_collections: collections_in_period(payments, today),
        total_arrears: balances.iter().map(|b| b.arrears).sum(),
        total_credit: balances.iter().map(|b| b.credit).sum(),
        tenants_in_arrears: balances.iter().filter(|b| b.in_arrears()).count(),
        tenants_in_credit: balances.iter().filter(|b| b.in_credit()).count(),
        occupancy: Occupancy::from_rooms(rooms),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::compute_balances;
    use crate::entities::Tenant;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
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

    fn fixture() -> (Vec<Tenant>, Vec<Room>, Vec<Payment>) {
        let tenants: Vec<Tenant> = serde_json::from_value(json!([
            {"id": 1, "name": "Amina", "email": "a@x.io", "phone": "1", "moving_in_date": "2025-01-10"},
            {"id": 2, "name": "Brian", "email": "b@x.io", "phone": "2", "moving_in_date": "2025-03-01"},
            {"id": 3, "name": "Chebet", "email": "c@x.io", "phone": "3", "moving_in_date": "2024-12-01"}
        ]))
        .unwrap();

        let rooms: Vec<Room> = serde_json::from_value(json!([
            {"id": 10, "room_number": "A-1", "status": "occupied", "rent_amount": 10000, "room_type": "single", "tenant_id": 1},
            {"id": 11, "room_number": "A-2", "status": "occupied", "rent_amount": 8000, "room_type": "single", "tenant_id": 2},
            {"id": 12, "room_number": "A-3", "status": "vacant", "rent_amount": 7000, "room_type": "single", "tenant_id": null},
            {"id": 13, "room_number": "A-4", "status": "maintenance", "rent_amount": 7000, "room_type": "single", "tenant_id": null}
        ]))
        .unwrap();

        // Tenant 3 moved out of their room but their payments remain
        let payments = vec![
            payment(1, 1, 10000.0, date(2025, 1, 10)),
            payment(2, 1, 10000.0, date(2025, 2, 10)),
            payment(3, 2, 40000.0, date(2025, 3, 1)),
            payment(4, 3, 6000.0, date(2024, 12, 5)),
        ];

        (tenants, rooms, payments)
    }

    #[test]
    fn test_summary_totals() {
        let today = date(2025, 3, 20);
        let (tenants, rooms, payments) = fixture();
        let balances = compute_balances(&tenants, &rooms, &payments, today);

        let s = summarize(&balances, &payments, &rooms, today);

        // Amina: 3 months × 10000 = 30000, paid 20000 → arrears 10000
        // Brian: 1 month × 8000 = 8000, paid 40000 → credit 32000
        assert_eq!(s.total_collections, 66000.0);
        assert_eq!(s.this_period_collections, 40000.0);
        assert_eq!(s.total_arrears, 10000.0);
        assert_eq!(s.total_credit, 32000.0);
        assert_eq!(s.tenants_in_arrears, 1);
        assert_eq!(s.tenants_in_credit, 1);
        assert_eq!(
            s.occupancy,
            Occupancy { total: 4, vacant: 1, occupied: 2, maintenance: 1 }
        );
        assert_eq!(s.occupancy.rate(), 50.0);

        println!("✅ Test passed: {}", s.summary());
    }

    #[test]
    fn test_collections_equal_paid_plus_roomless() {
        let today = date(2025, 3, 20);
        let (tenants, rooms, payments) = fixture();
        let balances = compute_balances(&tenants, &rooms, &payments, today);

        let paid_with_room: f64 = balances.iter().map(|b| b.total_paid).sum();
        let roomless: f64 = balances
            .iter()
            .filter(|b| !b.has_room())
            .map(|b| crate::balance::total_paid_by(b.tenant_id, &payments))
            .sum();

        assert_eq!(total_collections(&payments), paid_with_room + roomless);
    }

    #[test]
    fn test_non_numeric_payment_contributes_zero() {
        let today = date(2025, 3, 20);
        let payments: Vec<Payment> = serde_json::from_value(json!([
            {"id": 1, "tenant_id": 1, "payment_price": "abc", "payment_date": "2025-03-02"},
            {"id": 2, "tenant_id": 1, "payment_price": 500, "payment_date": "2025-03-03"},
            {"id": 3, "tenant_id": 1, "payment_price": null, "payment_date": "2025-03-04"}
        ]))
        .unwrap();

        let total = total_collections(&payments);
        let period = collections_in_period(&payments, today);

        assert_eq!(total, 500.0);
        assert_eq!(period, 500.0);
        assert!(!total.is_nan());
    }

    #[test]
    fn test_period_boundaries() {
        let today = date(2025, 3, 15);
        let payments = vec![
            payment(1, 1, 100.0, date(2025, 2, 28)), // last day of prior month
            payment(2, 1, 200.0, date(2025, 3, 1)),  // first day of current month
            payment(3, 1, 400.0, date(2025, 3, 31)), // last day of current month
            payment(4, 1, 800.0, date(2025, 4, 1)),  // next month
            payment(5, 1, 1600.0, date(2024, 3, 10)), // same month, prior year
        ];

        assert_eq!(collections_in_period(&payments, today), 600.0);
    }

    #[test]
    fn test_undated_payments_count_in_total_only() {
        let today = date(2025, 3, 15);
        let mut p = payment(1, 1, 750.0, today);
        p.payment_date = None;

        assert_eq!(total_collections(&[p.clone()]), 750.0);
        assert_eq!(collections_in_period(&[p], today), 0.0);
    }

    #[test]
    fn test_empty_portfolio() {
        let s = summarize(&[], &[], &[], date(2025, 1, 1));
        assert_eq!(s.total_collections, 0.0);
        assert_eq!(s.occupancy.rate(), 0.0);
    }
}
