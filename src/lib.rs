pub mod airline;
pub mod delay;
pub mod error;
pub mod output;
pub mod parser;
pub mod ranking;
pub mod rating;
