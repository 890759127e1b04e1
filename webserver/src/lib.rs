pub mod app;
pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod response;
