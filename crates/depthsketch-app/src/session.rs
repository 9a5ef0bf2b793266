//! Recorded input sessions.
//!
//! A session is a JSON document holding an optional canvas configuration
//! and the ordered input events of one run: pointer events, key events and
//! toolbar actions.

use crate::action::{UiAction, apply_action};
use crate::error::{AppError, AppResult};
use depthsketch_core::{Canvas, CanvasConfig, KeyEvent, PointerEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One recorded input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Ui(UiAction),
}

/// A recorded session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Canvas configuration. Defaults apply when absent.
    #[serde(default)]
    pub config: Option<CanvasConfig>,
    /// Seed for spray scatter, for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a session file.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::NotFound(path.display().to_string()));
        }
        let json = fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json).map_err(|e| {
            AppError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Write the session to a file.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let json = self
            .to_json()
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Build the canvas for this session. An explicit configuration wins
    /// over the session's own.
    pub fn canvas(&self, config: Option<CanvasConfig>) -> Canvas {
        let config = config.or_else(|| self.config.clone()).unwrap_or_default();
        match self.seed {
            Some(seed) => Canvas::with_seed(config, seed),
            None => Canvas::new(config),
        }
    }

    /// Feed every event to the canvas in order.
    pub fn replay(&self, canvas: &mut Canvas) {
        for (index, event) in self.events.iter().enumerate() {
            log::trace!("Event {index}: {event:?}");
            apply_event(canvas, event);
        }
        log::info!("Replayed {} events", self.events.len());
    }
}

/// Apply one recorded event to the canvas.
pub fn apply_event(canvas: &mut Canvas, event: &SessionEvent) {
    match event {
        SessionEvent::Pointer(pointer) => canvas.handle_pointer(pointer),
        SessionEvent::Key(key) => {
            if let Some(command) = canvas.handle_key(key) {
                log::debug!("Key ran {command:?}");
            }
        }
        SessionEvent::Ui(action) => apply_action(canvas, action),
    }
}
