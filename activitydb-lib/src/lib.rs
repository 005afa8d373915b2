pub mod error;
pub mod h2so4;
pub mod interp;
pub mod table;

pub use error::{ActivityDbError, Result};
pub use h2so4::{ActivityDb, ActivityEstimate, DEFAULT_ACTIVITY};
pub use activitydb_data;
