//! GlucoTrack command line: configuration, logging, terminal views and the
//! interactive session.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod session;
pub mod summary;
