#![allow(clippy::new_without_default)]

pub mod service;
pub mod waker;

pub use waker::{SingleFlight, SingleFlightWaker, WakerError, WakerState};
