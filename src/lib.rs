// HTTP server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;
pub mod sse;

// Reading domain and its storage
pub mod reading;
pub mod store;

// Assistant gateway and the clients it drives
pub mod assistant;
pub mod gateway;
pub mod llm;
pub mod tts;

pub mod config;
