//! Registrant intake service: validates form submissions, stores them once
//! per email address, and emails administrators about each new registrant.

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
