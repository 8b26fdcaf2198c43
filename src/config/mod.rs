pub mod booking_api;
pub mod proc_loader;
pub mod settings;
pub mod types;
