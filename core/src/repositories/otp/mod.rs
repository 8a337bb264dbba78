//! OTP record repository module.

#[path = "trait.rs"]
mod trait_;
pub use trait_::OtpRepository;

mod memory;
pub use memory::InMemoryOtpRepository;
