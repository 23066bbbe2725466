// 🗂️ Application State - The session's copy of rooms, tenants and payments
//
// State only changes through `AppState::apply(mutation)`, which consumes
// the old state and returns the new one. Refresh rule:
//
//   response carries the updated record  → patch it in
//   response carries only a message      → reload that collection
//
// Nothing here performs I/O; the API client produces the mutations.

use crate::balance::{compute_balances, room_of, TenantBalance};
use crate::entities::{Payment, Room, RoomStatus, Tenant};
use crate::portfolio::{summarize, PortfolioSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

// ============================================================================
// MUTATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Full reload of all three collections
    Loaded {
        rooms: Vec<Room>,
        tenants: Vec<Tenant>,
        payments: Vec<Payment>,
    },

    RoomAdded(Room),

    /// Assign / vacate / status change - the server returns the room
    RoomUpdated(Room),

    RoomDeleted(i64),

    TenantAdded(Tenant),

    /// Tenant updates answer with a message only, so tenants are re-fetched
    TenantsReloaded(Vec<Tenant>),

    /// The backend frees the tenant's room as part of the delete
    TenantDeleted(i64),

    PaymentAdded {
        payment: Payment,
        room: Option<Room>,
    },

    PaymentUpdated(Payment),
}

// ============================================================================
// PAYMENT HISTORY ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub payment_id: i64,
    pub date: Option<NaiveDate>,
    pub tenant_name: String,
    pub room_number: String,
    pub amount: f64,
}

const UNRESOLVED: &str = "N/A";

// ============================================================================
// APP STATE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub rooms: Vec<Room>,
    pub tenants: Vec<Tenant>,
    pub payments: Vec<Payment>,
}

impl AppState {
    pub fn new(rooms: Vec<Room>, tenants: Vec<Tenant>, payments: Vec<Payment>) -> Self {
        AppState::default().apply(Mutation::Loaded { rooms, tenants, payments })
    }

    pub fn apply(mut self, mutation: Mutation) -> Self {
        match mutation {
            Mutation::Loaded { rooms, tenants, payments } => {
                self.rooms = rooms;
                self.tenants = tenants;
                self.payments = payments;
                self.log_inconsistencies();
            }
            Mutation::RoomAdded(room) => {
                tracing::info!(room_id = room.id, room = %room.room_number, "room added");
                self.rooms.push(room);
            }
            Mutation::RoomUpdated(room) => {
                tracing::info!(room_id = room.id, status = %room.status, "room updated");
                upsert(&mut self.rooms, room, |r| r.id);
                self.log_inconsistencies();
            }
            Mutation::RoomDeleted(id) => {
                tracing::info!(room_id = id, "room deleted");
                self.rooms.retain(|r| r.id != id);
            }
            Mutation::TenantAdded(tenant) => {
                tracing::info!(tenant_id = tenant.id, "tenant added");
                self.tenants.push(tenant);
            }
            Mutation::TenantsReloaded(tenants) => {
                tracing::info!(count = tenants.len(), "tenants reloaded");
                self.tenants = tenants;
            }
            Mutation::TenantDeleted(id) => {
                tracing::info!(tenant_id = id, "tenant deleted");
                self.tenants.retain(|t| t.id != id);
                for room in self.rooms.iter_mut().filter(|r| r.is_held_by(id)) {
                    room.tenant_id = None;
                    room.status = RoomStatus::Vacant;
                }
            }
            Mutation::PaymentAdded { payment, room } => {
                tracing::info!(payment_id = payment.id, tenant_id = payment.tenant_id, "payment recorded");
                self.payments.push(payment);
                if let Some(room) = room {
                    upsert(&mut self.rooms, room, |r| r.id);
                }
            }
            Mutation::PaymentUpdated(payment) => {
                tracing::info!(payment_id = payment.id, "payment updated");
                upsert(&mut self.payments, payment, |p| p.id);
            }
        }

        self
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    pub fn room(&self, id: i64) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn tenant(&self, id: i64) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    pub fn room_of_tenant(&self, tenant_id: i64) -> Option<&Room> {
        room_of(tenant_id, &self.rooms)
    }

    /// Rooms breaking the occupied-iff-tenant rule
    pub fn inconsistent_rooms(&self) -> Vec<&Room> {
        self.rooms.iter().filter(|r| !r.is_consistent()).collect()
    }

    /// The backend refuses to delete a room with an active tenant
    pub fn can_delete_room(&self, id: i64) -> bool {
        self.room(id).map(|r| !r.is_occupied()).unwrap_or(false)
    }

    /// Tenants not holding any room (candidates for assignment)
    pub fn unassigned_tenants(&self) -> Vec<&Tenant> {
        self.tenants
            .iter()
            .filter(|t| self.room_of_tenant(t.id).is_none())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------------

    pub fn balances(&self, today: NaiveDate) -> Vec<TenantBalance> {
        compute_balances(&self.tenants, &self.rooms, &self.payments, today)
    }

    pub fn summary(&self, today: NaiveDate) -> PortfolioSummary {
        summarize(&self.balances(today), &self.payments, &self.rooms, today)
    }

    /// Payments newest first, with tenant and room resolved for display
    pub fn payment_history(&self) -> Vec<PaymentRow> {
        let mut rows: Vec<PaymentRow> = self
            .payments
            .iter()
            .map(|p| PaymentRow {
                payment_id: p.id,
                date: p.payment_date,
                tenant_name: self
                    .tenant(p.tenant_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| UNRESOLVED.to_string()),
                room_number: p
                    .room_id
                    .and_then(|id| self.room(id))
                    .map(|r| r.room_number.clone())
                    .unwrap_or_else(|| UNRESOLVED.to_string()),
                amount: p.payment_price,
            })
            .collect();

        // Undated payments sink to the bottom
        rows.sort_by_key(|r| Reverse(r.date));
        rows
    }

    fn log_inconsistencies(&self) {
        for room in self.inconsistent_rooms() {
            tracing::warn!(
                room_id = room.id,
                status = %room.status,
                tenant_id = ?room.tenant_id,
                "room status and tenant assignment disagree"
            );
        }
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> i64) {
    let id = key(&item);
    match items.iter_mut().find(|existing| key(existing) == id) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

// ============================================================================
// TESTS
// ============================================================================
