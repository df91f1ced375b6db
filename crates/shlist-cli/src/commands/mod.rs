//! Command handlers

pub mod config;
pub mod identity;
pub mod lists;
pub mod shell;
