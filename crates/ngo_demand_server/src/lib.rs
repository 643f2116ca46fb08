//! REST backend for coordinating surplus-food donations between NGOs and restaurants.
//!
//! NGOs post demands, restaurants browse the open ones and accept or ignore them. The
//! [`manager::DemandManager`] enforces who may do what and funnels every status change
//! through the conditional update of [`store::DemandStore`].

pub mod auth;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod rest;
pub mod state;
pub mod store;

pub use error::{DemandError, Result};
pub use manager::DemandManager;
pub use state::AppState;
