pub mod auth;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod logo;
pub mod providers;
pub mod ratelimit;
