pub mod loader;

pub use loader::{BracketScheduleRecord, ScheduleLoader, ScheduleLoaderError};
