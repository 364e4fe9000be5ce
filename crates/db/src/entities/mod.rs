//! `SeaORM` entity definitions.

pub mod users;
