//! Core use-case services.
//!
//! # Responsibility
//! - Focus-mode navigation, phrase/pack transfer and the journal controller.
//! - Keep UI layers decoupled from storage details.

pub mod focus;
pub mod journal;
pub mod transfer;
