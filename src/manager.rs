// manager.rs — Orchestrates the capture → analysis → result flow.
//
// Owns the one Session and the one provider handle. UI event handlers call
// the transition methods; `submit_frame` is the single suspension point,
// and its resolution is the only thing that re-enters the state machine.

use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as TokioMutex;

use crate::ai::gemini::GeminiVisionClient;
use crate::ai::{AuraReading, VisionProvider};
use crate::frame::Frame;
use crate::session::{Phase, Session, SessionError};
use crate::settings::Settings;

/// The one message shown for any analysis failure. The typed error goes to
/// the log; the user just gets invited to try again.
pub const ANALYSIS_FAILED_MESSAGE: &str = "분석에 실패했어요. 다시 시도해볼까요?";

/// Single owner and single writer of a [`Session`].
///
/// The session lives behind an async mutex that is never held across the
/// analysis await; each dispatched analysis carries a generation token, and
/// a resolution whose token or phase no longer matches the live session is
/// discarded instead of applied.
pub struct SessionManager {
    session: TokioMutex<Session>,
    provider: Mutex<Option<Arc<dyn VisionProvider>>>,
    generation: Mutex<u64>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            session: TokioMutex::new(Session::new()),
            provider: Mutex::new(None),
            generation: Mutex::new(0),
        }
    }

    /// Configure the Gemini vision provider from settings.
    pub fn configure_gemini(&self, settings: &Settings) {
        let client = GeminiVisionClient::from_settings(settings);
        *self.provider.lock().unwrap() = Some(Arc::new(client));
        log::info!(
            "SessionManager: gemini provider configured (model={})",
            settings.model
        );
    }

    /// Install an arbitrary provider. Tests inject mocks through this.
    pub fn set_provider(&self, provider: Arc<dyn VisionProvider>) {
        *self.provider.lock().unwrap() = Some(provider);
    }

    /// Check if a provider is configured.
    pub fn is_configured(&self) -> bool {
        self.provider.lock().unwrap().is_some()
    }

    /// Idle → Capturing.
    pub async fn begin_capture(&self) -> Result<(), SessionError> {
        self.session.lock().await.start()
    }

    /// Capturing → Idle without invoking analysis.
    pub async fn cancel_capture(&self) -> Result<(), SessionError> {
        self.session.lock().await.cancel_capture()
    }

    /// Result → Idle.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.session.lock().await.reset()
    }

    /// Capturing → Analyzing → (Result | Idle).
    ///
    /// Stores the frame, dispatches exactly one analysis call, and maps its
    /// resolution back onto the session. Returns the phase the session
    /// landed in. The phase guard inside `frame_captured` is what rules out
    /// a second concurrent analysis.
    pub async fn submit_frame(&self, frame: Frame) -> Result<Phase, SessionError> {
        let provider = {
            let p = self.provider.lock().unwrap();
            match p.as_ref() {
                Some(p) => Arc::clone(p),
                None => return Err(SessionError::NotConfigured),
            }
        };

        let generation = {
            let mut session = self.session.lock().await;
            session.frame_captured(frame.clone())?;
            let mut gen = self.generation.lock().unwrap();
            *gen += 1;
            *gen
        };
        log::info!(
            "Analysis #{} dispatched to {} ({:?})",
            generation,
            provider.name(),
            frame
        );

        let outcome = provider.analyze(&frame).await;

        let mut session = self.session.lock().await;
        let live = *self.generation.lock().unwrap();
        if live != generation || session.phase() != Phase::Analyzing {
            log::warn!(
                "Analysis #{} resolved after the session moved on (live #{}, phase {:?}); discarding",
                generation,
                live,
                session.phase()
            );
            return Ok(session.phase());
        }

        match outcome {
            Ok(reading) => {
                log::info!("Analysis #{} succeeded: \"{}\"", generation, reading.vibe_title);
                session.analysis_succeeded(reading)?;
            }
            Err(e) => {
                log::error!("Analysis #{} failed: {}", generation, e);
                session.analysis_failed(ANALYSIS_FAILED_MESSAGE)?;
            }
        }
        Ok(session.phase())
    }

    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase()
    }

    pub async fn last_reading(&self) -> Option<AuraReading> {
        self.session.lock().await.last_reading().cloned()
    }

    pub async fn last_frame(&self) -> Option<Frame> {
        self.session.lock().await.last_frame().cloned()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.session.lock().await.last_error().map(String::from)
    }
}
