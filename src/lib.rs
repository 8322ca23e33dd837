//! Manual order cart for the restaurant admin panel: cart state, pricing,
//! an event-sourced cart lifecycle, and packaging of order requests.

pub mod config;
pub mod domain;
pub mod event_sourcing;
