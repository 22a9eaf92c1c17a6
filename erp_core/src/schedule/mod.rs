pub mod dto;
pub mod gate;

pub use dto::{RunState, ScheduleConfig};
pub use gate::should_run_now;
