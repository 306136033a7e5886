pub mod display;
pub mod export;
pub mod mock;
pub mod parser;
pub mod staffing;
pub mod web;
