mod config;
mod error;
mod health;
mod metrics;
mod retry;
