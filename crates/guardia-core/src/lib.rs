//! Core state and logic for the En Guàrdia episode browser.
//!
//! Everything here is UI-agnostic: the terminal front-end in `guardia-tui`
//! owns one instance of each store/controller and drives them from its event
//! loop.

pub mod browse;
pub mod catalog;
pub mod collate;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod media;
pub mod pipeline;
pub mod platform;
pub mod player;
pub mod prefs;
pub mod storage;
