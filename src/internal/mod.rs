// src/internal/mod.rs

pub mod config;
pub mod logger;
