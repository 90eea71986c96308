//! `SeaORM` entity definitions.

pub mod bills;
pub mod consumers;
pub mod support_info;
pub mod users;
