// Library exports for the Warden process supervisor

pub mod cli;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod maintenance;
pub mod process;
pub mod supervisor;
