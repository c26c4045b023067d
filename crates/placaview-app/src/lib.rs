//! Application layer - config, camera capture flow, view state

pub mod camera;
pub mod capture;
pub mod config;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;
