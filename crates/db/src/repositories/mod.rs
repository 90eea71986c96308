//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod bill;
pub mod consumer;
pub mod support;
pub mod user;

pub use bill::{BillRepository, UpsertBillInput};
pub use consumer::{ConsumerMetrics, ConsumerRepository, UpdateConsumerInput};
pub use support::{SupportRepository, UpdateSupportInput};
pub use user::{UpdateUserInput, UserRepository};
