pub mod preview;
pub mod time;
