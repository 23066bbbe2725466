// 💵 Payment Entity - One recorded rent payment
//
// Payments are facts: once recorded they only change through an
// explicit update (amount correction).

use crate::parse::{lenient_amount, lenient_date, serialize_date};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,

    pub tenant_id: i64,

    #[serde(default)]
    pub room_id: Option<i64>,

    /// Amount paid; anything unparseable is 0.0
    #[serde(default, alias = "amount", deserialize_with = "lenient_amount")]
    pub payment_price: f64,

    #[serde(
        default,
        alias = "date",
        deserialize_with = "lenient_date",
        serialize_with = "serialize_date"
    )]
    pub payment_date: Option<NaiveDate>,
}

impl Payment {
    /// True when the payment date falls in the same calendar month and year as `day`
    pub fn is_in_month_of(&self, day: NaiveDate) -> bool {
        match self.payment_date {
            Some(d) => d.year() == day.year() && d.month() == day.month(),
            None => false,
        }
    }
}

/// `POST /payments`
///
/// The backend reads the amount from `amount` and stamps the date itself;
/// the date and room are sent along for backends that honor them.
#[derive(Debug, Clone, Serialize)]
pub struct NewPayment {
    pub tenant_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i64>,

    pub amount: f64,

    #[serde(serialize_with = "serialize_date", skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
}

/// `PUT /payments/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct PaymentPatch {
    pub amount: f64,
}

/// `POST /payments` answers either `{"payment": {...}, "room": {...}}`
/// or the bare payment.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordedPayment {
    Wrapped {
        payment: Payment,
        #[serde(default)]
        room: Option<super::Room>,
    },
    Bare(Payment),
}

impl RecordedPayment {
    pub fn into_parts(self) -> (Payment, Option<super::Room>) {
        match self {
            RecordedPayment::Wrapped { payment, room } => (payment, room),
            RecordedPayment::Bare(payment) => (payment, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_from_list_endpoint() {
        let p: Payment = serde_json::from_value(json!({
            "id": 11,
            "amount": 10000.0,
            "date": "2025-03-05",
            "tenant_id": 2,
            "mpesa_receipt": null,
            "phone_number": null
        }))
        .unwrap();

        assert_eq!(p.payment_price, 10000.0);
        assert_eq!(p.payment_date, NaiveDate::from_ymd_opt(2025, 3, 5));
        assert_eq!(p.room_id, None);
    }

    #[test]
    fn test_payment_with_non_numeric_price() {
        let p: Payment = serde_json::from_value(json!({
            "id": 12,
            "tenant_id": 2,
            "room_id": 3,
            "payment_price": "ten thousand",
            "payment_date": "2025-03-05"
        }))
        .unwrap();

        assert_eq!(p.payment_price, 0.0);
        assert!(!p.payment_price.is_nan());
    }

    #[test]
    fn test_is_in_month_of() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();
        let mut p: Payment = serde_json::from_value(json!({
            "id": 1, "tenant_id": 1, "payment_price": 100, "payment_date": "2025-03-01"
        }))
        .unwrap();
        assert!(p.is_in_month_of(today));

        p.payment_date = NaiveDate::from_ymd_opt(2025, 2, 28);
        assert!(!p.is_in_month_of(today));

        p.payment_date = NaiveDate::from_ymd_opt(2024, 3, 10);
        assert!(!p.is_in_month_of(today));

        p.payment_date = None;
        assert!(!p.is_in_month_of(today));
    }

    #[test]
    fn test_recorded_payment_shapes() {
        let wrapped: RecordedPayment = serde_json::from_value(json!({
            "payment": {"id": 5, "amount": 2000, "date": "2025-03-01", "tenant_id": 1}
        }))
        .unwrap();
        let (payment, room) = wrapped.into_parts();
        assert_eq!(payment.id, 5);
        assert!(room.is_none());

        let bare: RecordedPayment = serde_json::from_value(json!({
            "id": 6, "payment_price": 3000, "payment_date": "2025-03-02", "tenant_id": 1
        }))
        .unwrap();
        let (payment, _) = bare.into_parts();
        assert_eq!(payment.id, 6);
        assert_eq!(payment.payment_price, 3000.0);
    }

    #[test]
    fn test_new_payment_body() {
        let body = serde_json::to_value(NewPayment {
            tenant_id: 2,
            room_id: Some(3),
            amount: 10000.0,
            payment_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"tenant_id": 2, "room_id": 3, "amount": 10000.0, "payment_date": "2025-03-01"})
        );
    }
}
