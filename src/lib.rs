// Public API - data types, engine and export functions
pub mod config;
pub mod error;
pub mod export;
pub mod probe;
pub mod state;
pub mod trace;

// Command-line surface and name resolution used by the binary
pub mod cli;
pub mod lookup;
