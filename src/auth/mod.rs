//! Auth Session Module
//!
//! Minimal session flag gating the admin area. Shares the storage pattern
//! of the cart store; the admin API itself re-validates every privileged
//! request, so nothing here is a security boundary.

pub mod state;

pub use state::{AuthSession, AuthState, AuthStore};
