pub mod dto;
pub mod formatter;
pub mod pipeline;

pub use dto::{ReportOutcome, ReportPayload, SectionData};
pub use formatter::{format_failure, format_report};
pub use pipeline::run_report;
