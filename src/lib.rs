// src/lib.rs

//! Story search client library

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod query;
pub mod search;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;
