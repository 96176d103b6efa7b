pub mod config;
pub mod db;
pub mod merge;
pub mod pacing;
pub mod pipeline;
