pub mod calibrate;
pub mod catalog;
pub mod config;
pub mod utils;
