pub mod captcha;
pub mod carrier;
pub mod extract;
pub mod filehost;
pub mod tracking;

#[cfg(test)]
pub(crate) mod fake;

pub use captcha::{CaptchaSolver, PromptSolver};
pub use carrier::{Carrier, CarrierProfile};
pub use filehost::{FileHostClient, FileHostProfile};
pub use tracking::TrackingClient;
