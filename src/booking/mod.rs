pub mod client;
pub mod error;
pub mod payload;

pub use client::{BookingClient, BookingResponse};
pub use error::BookingError;
