pub mod rest;
pub mod symbols;
pub mod types;
