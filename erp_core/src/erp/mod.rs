pub mod camu;
pub mod client;
pub mod dto;
mod wire;

pub use camu::CamuClient;
pub use client::ErpClient;
pub use dto::{Attendance, ErpSession, Menu, MenuItem, Period, SubjectAttendance};
