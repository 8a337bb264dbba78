//! Signing session repository module.

#[path = "trait.rs"]
mod trait_;
pub use trait_::SessionRepository;

mod memory;
pub use memory::InMemorySessionRepository;
