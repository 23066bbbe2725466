// 🏠 Room Entity - A rentable unit and its occupancy
//
// Invariant (enforced by the backend, checked here):
//   status == Occupied  ⇔  tenant_id.is_some()
//
// The room's rent_amount is the monthly billing unit used by the
// balance calculator.

use crate::parse::lenient_amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// ROOM STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Ready to be let
    #[default]
    Vacant,

    /// A tenant is assigned
    Occupied,

    /// Temporarily out of service
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Vacant => "vacant",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "vacant" => Some(RoomStatus::Vacant),
            "occupied" => Some(RoomStatus::Occupied),
            "maintenance" => Some(RoomStatus::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ROOM ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,

    /// Display label (e.g., "A-12")
    #[serde(alias = "room_id")]
    pub room_number: String,

    #[serde(default)]
    pub status: RoomStatus,

    /// Monthly rent
    #[serde(default, deserialize_with = "lenient_amount")]
    pub rent_amount: f64,

    /// Category (single, bedsitter, one-bedroom, ...)
    #[serde(default, alias = "type")]
    pub room_type: String,

    #[serde(default)]
    pub tenant_id: Option<i64>,
}

impl Room {
    pub fn is_occupied(&self) -> bool {
        self.tenant_id.is_some()
    }

    /// `occupied` iff a tenant is set
    pub fn is_consistent(&self) -> bool {
        (self.status == RoomStatus::Occupied) == self.tenant_id.is_some()
    }

    pub fn is_held_by(&self, tenant_id: i64) -> bool {
        self.tenant_id == Some(tenant_id)
    }
}

// ============================================================================
// REQUEST BODIES
// ============================================================================

/// `POST /rooms`
#[derive(Debug, Clone, Serialize)]
pub struct NewRoom {
    pub room_number: String,
    pub room_type: String,
    pub rent_amount: f64,
    pub status: RoomStatus,
}

impl NewRoom {
    pub fn new(room_number: impl Into<String>, room_type: impl Into<String>, rent_amount: f64) -> Self {
        NewRoom {
            room_number: room_number.into(),
            room_type: room_type.into(),
            rent_amount,
            status: RoomStatus::Vacant,
        }
    }
}

/// `PUT /rooms/{id}` - only the fields present are changed.
///
/// `tenant_id` is tri-state: absent (leave alone), `null` (clear), value (set).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RoomStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Option<i64>>,
}

impl RoomUpdate {
    pub fn assign(tenant_id: i64) -> Self {
        RoomUpdate {
            status: Some(RoomStatus::Occupied),
            tenant_id: Some(Some(tenant_id)),
        }
    }

    pub fn vacate() -> Self {
        RoomUpdate {
            status: Some(RoomStatus::Vacant),
            tenant_id: Some(None),
        }
    }

    /// Body moving `room` to `status` with the tenant reference kept in step.
    ///
    /// - vacant      → tenant cleared
    /// - occupied    → only for a room that already has a tenant
    /// - maintenance → only for a room without a tenant
    pub fn status_change(room: &Room, status: RoomStatus) -> Result<Self, StatusChangeError> {
        match (status, room.tenant_id) {
            (RoomStatus::Vacant, _) => Ok(Self::vacate()),
            (RoomStatus::Occupied, Some(tenant_id)) => Ok(Self::assign(tenant_id)),
            (RoomStatus::Occupied, None) => Err(StatusChangeError::NoTenant(room.room_number.clone())),
            (RoomStatus::Maintenance, Some(_)) => Err(StatusChangeError::HasTenant(room.room_number.clone())),
            (RoomStatus::Maintenance, None) => Ok(RoomUpdate {
                status: Some(RoomStatus::Maintenance),
                tenant_id: Some(None),
            }),
        }
    }
}

/// A status change that would leave status and tenant disagreeing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusChangeError {
    #[error("Room {0} has no tenant; use assign to occupy it")]
    NoTenant(String),

    #[error("Room {0} has a tenant; vacate it before maintenance")]
    HasTenant(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_from_api_shape() {
        let room: Room = serde_json::from_value(json!({
            "id": 3,
            "room_number": "A-12",
            "room_type": "bedsitter",
            "rent_amount": 10000.0,
            "status": "occupied",
            "tenant_id": 7
        }))
        .unwrap();

        assert_eq!(room.room_number, "A-12");
        assert_eq!(room.status, RoomStatus::Occupied);
        assert_eq!(room.rent_amount, 10000.0);
        assert!(room.is_occupied());
        assert!(room.is_consistent());
        assert!(room.is_held_by(7));
    }

    #[test]
    fn test_room_with_bad_rent_and_missing_fields() {
        let room: Room = serde_json::from_value(json!({
            "id": 1,
            "room_number": "B-1",
            "rent_amount": "n/a"
        }))
        .unwrap();

        assert_eq!(room.rent_amount, 0.0);
        assert_eq!(room.status, RoomStatus::Vacant);
        assert_eq!(room.tenant_id, None);
        assert!(room.is_consistent());
    }

    #[test]
    fn test_inconsistent_rooms() {
        let mut room: Room = serde_json::from_value(json!({
            "id": 1, "room_number": "C-3", "status": "occupied", "rent_amount": 5000
        }))
        .unwrap();
        assert!(!room.is_consistent());

        room.status = RoomStatus::Maintenance;
        room.tenant_id = Some(2);
        assert!(!room.is_consistent());
    }

    #[test]
    fn test_room_update_bodies() {
        let body = serde_json::to_value(RoomUpdate::assign(9)).unwrap();
        assert_eq!(body, json!({"status": "occupied", "tenant_id": 9}));

        let body = serde_json::to_value(RoomUpdate::vacate()).unwrap();
        assert_eq!(body, json!({"status": "vacant", "tenant_id": null}));

    }

    fn room(status: RoomStatus, tenant_id: Option<i64>) -> Room {
        Room {
            id: 5,
            room_number: "D-5".to_string(),
            status,
            rent_amount: 7000.0,
            room_type: "single".to_string(),
            tenant_id,
        }
    }

    #[test]
    fn test_status_change_keeps_tenant_in_step() {
        let occupied = room(RoomStatus::Occupied, Some(4));
        let vacant = room(RoomStatus::Vacant, None);

        // Vacating always clears the tenant
        let body = serde_json::to_value(RoomUpdate::status_change(&occupied, RoomStatus::Vacant).unwrap()).unwrap();
        assert_eq!(body, json!({"status": "vacant", "tenant_id": null}));

        // Maintenance only on an empty room
        let body = serde_json::to_value(RoomUpdate::status_change(&vacant, RoomStatus::Maintenance).unwrap()).unwrap();
        assert_eq!(body, json!({"status": "maintenance", "tenant_id": null}));
        assert_eq!(
            RoomUpdate::status_change(&occupied, RoomStatus::Maintenance).unwrap_err(),
            StatusChangeError::HasTenant("D-5".to_string())
        );

        // Occupied needs a tenant already on the room
        let body = serde_json::to_value(RoomUpdate::status_change(&occupied, RoomStatus::Occupied).unwrap()).unwrap();
        assert_eq!(body, json!({"status": "occupied", "tenant_id": 4}));
        let err = RoomUpdate::status_change(&vacant, RoomStatus::Occupied).unwrap_err();
        assert_eq!(err, StatusChangeError::NoTenant("D-5".to_string()));
        assert!(err.to_string().contains("assign"));

        println!("✅ Test passed: status changes never split status from tenant");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(RoomStatus::parse("Maintenance"), Some(RoomStatus::Maintenance));
        assert_eq!(RoomStatus::parse(" vacant "), Some(RoomStatus::Vacant));
        assert_eq!(RoomStatus::parse("closed"), None);
    }
}
