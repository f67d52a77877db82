pub mod checkin;
pub mod db;
pub mod schema;
pub mod scoring;
pub mod server;
pub mod settings;
pub mod transcribe;
pub mod utils;
