#![forbid(unsafe_code)]

//! Core: visibility watching, lifecycle effects, branding, and team data shapes.

pub mod config;
pub mod error;
pub mod logo;
pub mod reactive;
pub mod team;
pub mod visibility;

pub use error::{Result, WatchError};
