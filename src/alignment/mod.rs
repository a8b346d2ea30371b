pub mod activity;
pub mod search;

pub use activity::activity_signal;
pub use search::{find_offset, measure_error};
