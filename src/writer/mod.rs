pub mod postgres;
pub mod schema_gen;

pub use self::postgres::{connect, PgWriter};
pub use schema_gen::*;
