// src/models/mod.rs

pub mod friendship;
pub mod user;
