//! KORO Brain - decision engine for the overseer boss

pub mod brain;
pub mod core;
pub mod history;
pub mod llm;
pub mod providers;
pub mod snapshot;
