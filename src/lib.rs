pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod geocoder;
pub mod ledger;
pub mod pipeline;
pub mod relocate;
pub mod scanner;
