pub mod lead;
pub mod log;
pub mod message;
