pub mod adapters;
pub mod config;
pub mod error;
pub mod mocks;
pub mod token;
pub mod uploads;
pub mod web;
