// Entity Models - the three record types served by the Remote API
//
// Each entity:
// - is identified by the backend's integer id
// - accepts the field names of both the list endpoints and the models
// - parses amounts and dates through `crate::parse` (never fails on bad data)

pub mod room;
pub mod tenant;
pub mod payment;

pub use room::{NewRoom, Room, RoomStatus, RoomUpdate, StatusChangeError};
pub use tenant::{NewTenant, Tenant, TenantPatch};
pub use payment::{NewPayment, Payment, PaymentPatch, RecordedPayment};
