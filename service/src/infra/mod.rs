//! Infrastructure layer.

pub mod database;
pub mod storage;

pub use self::{
    database::{Database, Memory},
    storage::{Firebase, Storage},
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
