// 👤 Tenant Entity - A person renting (at most) one room
//
// The moving-in date is when billing periods start accruing.
// Which room a tenant holds is NOT stored here: it is read from
// the room side (`Room::tenant_id`), the same way the backend does.

use crate::parse::{lenient_date, serialize_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,

    #[serde(alias = "tenant_name")]
    pub name: String,

    #[serde(default, alias = "tenant_email")]
    pub email: String,

    #[serde(default, alias = "phone_number", deserialize_with = "null_as_empty")]
    pub phone: String,

    /// None when the API sent nothing usable
    #[serde(
        default,
        deserialize_with = "lenient_date",
        serialize_with = "serialize_date"
    )]
    pub moving_in_date: Option<NaiveDate>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `POST /tenants` - the backend stamps today's date as moving-in date.
#[derive(Debug, Clone, Serialize)]
pub struct NewTenant {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// `PATCH /tenants/{id}`
#[derive(Debug, Clone, Default, Serialize)]
pub struct TenantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl TenantPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tenant_from_api_shape() {
        let t: Tenant = serde_json::from_value(json!({
            "id": 4,
            "name": "Jane Wanjiru",
            "email": "jane@example.com",
            "phone": "0712345678",
            "room_id": null,
            "moving_in_date": "2025-02-01"
        }))
        .unwrap();

        assert_eq!(t.name, "Jane Wanjiru");
        assert_eq!(t.moving_in_date, NaiveDate::from_ymd_opt(2025, 2, 1));
    }

    #[test]
    fn test_tenant_model_field_names() {
        let t: Tenant = serde_json::from_value(json!({
            "id": 4,
            "tenant_name": "Otieno",
            "tenant_email": "o@example.com",
            "phone_number": null,
            "moving_in_date": "not-a-date"
        }))
        .unwrap();

        assert_eq!(t.name, "Otieno");
        assert_eq!(t.email, "o@example.com");
        assert_eq!(t.phone, "");
        assert_eq!(t.moving_in_date, None);
    }

    #[test]
    fn test_tenant_patch_skips_unset_fields() {
        let patch = TenantPatch {
            phone: Some("0700000000".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"phone": "0700000000"}));
        assert!(TenantPatch::default().is_empty());
    }
}
