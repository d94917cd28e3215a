pub mod bills;
pub mod config;
pub mod format;
pub mod http;
pub mod new_bill;
pub mod views;
