pub mod binding;
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod mapping;
