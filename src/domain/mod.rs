//! Core domain types and logic.

pub mod price;
pub mod normalizer;
pub mod performance;
pub mod monthly;
pub mod profile;
pub mod export;
pub mod view;
pub mod error;
