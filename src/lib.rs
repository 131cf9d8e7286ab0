pub mod config;
pub mod document;
pub mod errors;
pub mod highlight;
pub mod logging;
pub mod parsers;
pub mod session;
