//! Business services.
//!
//! Services own the rules; repositories own the SQL. Each service borrows the
//! pool per request; there is no process-wide store handle.

pub mod auth;
pub mod google;
pub mod orders;

pub use auth::AuthService;
pub use google::GoogleVerifier;
pub use orders::OrderService;
