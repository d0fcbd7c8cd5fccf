// Library exports for the Cyber Worm simulation
// The host binary and the replay tool both build on these modules

pub mod chain;
pub mod config;
pub mod controller;
pub mod event_log;
pub mod host;
pub mod placement;
pub mod replay;
pub mod score;
pub mod score_sink;
pub mod simulation;
pub mod ticker;
pub mod types;
