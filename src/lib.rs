pub mod api;
pub mod chat;
pub mod config;
pub mod context;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod stomp;
