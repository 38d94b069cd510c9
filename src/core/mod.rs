pub mod config;
pub mod constants;
pub mod controller;
pub mod geo;
pub mod view_state;
