// Library exports for fitforge-server
// Integration tests build the router from these modules

pub mod api;
pub mod billing;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod db;
pub mod planner;
pub mod routes;
pub mod session;
pub mod state;
pub mod upstream;
pub mod video;
