pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod dark_list;
pub mod error;
pub mod name_generator;
pub mod pipeline;
pub mod privacy;
pub mod record;
pub mod rng;
pub mod sample;
pub mod types;
