//! Personal mood/aura analysis core.
//!
//! A captured photo flows through a four-phase session (idle → capturing →
//! analyzing → result): the frame is sent to a vision model exactly once,
//! the structured reading (or a failure) drives the session back out, and
//! the presentation layer renders whatever phase it finds.
//!
//! The camera and the screens are external collaborators; this crate owns
//! the state machine and the analysis-request contract.

pub mod ai;
pub mod frame;
pub mod manager;
pub mod session;
pub mod settings;

pub use ai::{AnalysisError, AuraReading, VisionProvider};
pub use frame::Frame;
pub use manager::SessionManager;
pub use session::{Phase, Session, SessionError};
pub use settings::Settings;
