pub mod id;
pub mod time;

pub use time::utc_timestamp;
