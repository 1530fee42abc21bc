// session.rs — The capture → analysis → result state machine. One session,
// four phases, six guarded transitions; everything else in the crate exists
// to feed this.

use serde::{Deserialize, Serialize};

use crate::ai::AuraReading;
use crate::frame::Frame;

/// The discrete state of a session. Drives which screen the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Capturing,
    Analyzing,
    Result,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

/// A transition was attempted that the current phase does not permit, or its
/// input was unusable. The session is left exactly as it was.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{event} is not a valid transition from {from:?}")]
    InvalidTransition { from: Phase, event: &'static str },
    #[error("captured frame is empty")]
    EmptyFrame,
    #[error("no vision provider configured")]
    NotConfigured,
}

/// The single stateful entity: which phase is live, plus the captured frame,
/// the reading, and the last user-facing error.
///
/// Invariants:
/// * `last_reading` is `Some` only while `phase == Result`.
/// * `last_error` is cleared by every transition except `analysis_failed`.
/// * Only one `Analyzing` phase can be active at a time — the phase guard on
///   `frame_captured` is what rules out duplicate concurrent analyses.
#[derive(Debug, Default)]
pub struct Session {
    phase: Phase,
    last_frame: Option<Frame>,
    last_reading: Option<AuraReading>,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn last_reading(&self) -> Option<&AuraReading> {
        self.last_reading.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn guard(&self, expected: Phase, event: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.phase,
                event,
            })
        }
    }

    /// Idle → Capturing. Opens the camera view; clears any previous error.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.guard(Phase::Idle, "start")?;
        self.last_error = None;
        self.phase = Phase::Capturing;
        Ok(())
    }

    /// Capturing → Analyzing. Stores the frame; the caller owes exactly one
    /// analysis call for it. An empty frame is rejected with the session
    /// still in Capturing.
    pub fn frame_captured(&mut self, frame: Frame) -> Result<(), SessionError> {
        self.guard(Phase::Capturing, "frame_captured")?;
        if frame.is_empty() {
            return Err(SessionError::EmptyFrame);
        }
        self.last_error = None;
        self.last_frame = Some(frame);
        self.phase = Phase::Analyzing;
        Ok(())
    }

    /// Analyzing → Result. Only valid as the resolution of the analysis call
    /// triggered by the matching `frame_captured`.
    pub fn analysis_succeeded(&mut self, reading: AuraReading) -> Result<(), SessionError> {
        self.guard(Phase::Analyzing, "analysis_succeeded")?;
        self.last_error = None;
        self.last_reading = Some(reading);
        self.phase = Phase::Result;
        Ok(())
    }

    /// Analyzing → Idle. Records the user-facing message and discards the
    /// frame; no distinct error phase is retained.
    pub fn analysis_failed(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        self.guard(Phase::Analyzing, "analysis_failed")?;
        self.last_error = Some(message.into());
        self.last_frame = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Result → Idle. Drops the frame and the reading.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.guard(Phase::Result, "reset")?;
        self.last_error = None;
        self.last_frame = None;
        self.last_reading = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Capturing → Idle, without invoking analysis.
    pub fn cancel_capture(&mut self) -> Result<(), SessionError> {
        self.guard(Phase::Capturing, "cancel_capture")?;
        self.last_error = None;
        self.phase = Phase::Idle;
        Ok(())
    }
}
