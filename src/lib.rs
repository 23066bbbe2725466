// Serene Manager - Core Library
// Shared by the CLI / terminal dashboard, the dashboard web server, and tests

pub mod parse;
pub mod entities;
pub mod balance;
pub mod portfolio;
pub mod state;
pub mod api;
pub mod config;
pub mod logging;
pub mod report;

// Re-export commonly used types
pub use entities::{
    NewPayment, NewRoom, NewTenant, Payment, PaymentPatch, Room, RoomStatus, RoomUpdate, StatusChangeError,
    Tenant, TenantPatch,
};
pub use balance::{
    active_balances, compute_balances, compute_tenant_balance, months_elapsed, suggested_payment,
    BalanceStatus, TenantBalance,
};
pub use portfolio::{summarize, Occupancy, PortfolioSummary};
pub use state::{AppState, Mutation, PaymentRow};
pub use api::{ApiError, RemoteApi, Session, User};
pub use config::Config;
pub use report::{format_currency, format_money};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
