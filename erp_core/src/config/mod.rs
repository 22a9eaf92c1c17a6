pub mod dto;
pub mod handler;

pub use dto::Config;
