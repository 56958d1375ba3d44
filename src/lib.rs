pub mod cache;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod queries;
pub mod repositories;
pub mod services;
