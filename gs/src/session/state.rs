//! Session state and operation outcomes

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::domain::{ChatMessage, DesignComplexity, EncodedImage, FeatureSelection, GardenStyle};
use crate::llm::LlmError;

/// Which screen the front end should show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Landing,
    Studio,
    Gallery,
}

/// Everything collected on the landing view before the first design
#[derive(Debug, Clone, Default)]
pub struct StudioInputs {
    pub yard_photo: Option<EncodedImage>,
    pub reference_image: Option<EncodedImage>,
    /// `None` while a reference image stands in for a style
    pub style: Option<GardenStyle>,
    pub complexity: DesignComplexity,
    /// Free-text special requests
    pub requirements: String,
    pub selection: FeatureSelection,
}

impl StudioInputs {
    pub fn new(style: Option<GardenStyle>, complexity: DesignComplexity) -> Self {
        Self {
            style,
            complexity,
            ..Default::default()
        }
    }

    /// Style for the next design
    ///
    /// Falls back to Modern Minimalist when neither a style nor a reference
    /// image has been chosen.
    pub fn effective_style(&self) -> Option<GardenStyle> {
        match (self.style, &self.reference_image) {
            (Some(style), _) => Some(style),
            (None, Some(_)) => None,
            (None, None) => Some(GardenStyle::Modern),
        }
    }
}

/// Snapshot of the in-flight operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyFlags {
    pub detecting: bool,
    pub generating: bool,
    pub chatting: bool,
}

/// Result of uploading a yard photo
#[derive(Debug)]
pub enum Detection {
    /// A detection was already running
    Ignored,
    /// Labels found, all selected for keeping
    Found(Vec<String>),
    /// The detector failed; the selection stays empty
    Failed(LlmError),
}

/// Result of sending a chat message
#[derive(Debug)]
pub enum ChatOutcome {
    /// Blank message, no active project, or an operation already in flight
    Ignored,
    /// A new render was produced
    Redesigned(ChatMessage),
    /// A text answer was appended
    Advised(ChatMessage),
    /// The call failed; the client message stays in history unanswered
    Failed(SessionError),
}

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Upload a photo of your yard first")]
    NoYardPhoto,

    #[error("No project matches '{0}'")]
    UnknownProject(String),

    #[error(transparent)]
    Architect(#[from] LlmError),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl SessionError {
    /// Wait suggested by the architect when it rate limited the call
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SessionError::Architect(e) if e.is_rate_limit() => e.retry_after(),
            _ => None,
        }
    }
}

/// Marks one kind of operation as in flight until dropped
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    /// Claim the flag, or `None` if it is already held
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_is_exclusive_until_dropped() {
        let flag = AtomicBool::new(false);

        let guard = BusyGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(BusyGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_effective_style() {
        let mut inputs = StudioInputs::new(None, DesignComplexity::Balanced);
        assert_eq!(inputs.effective_style(), Some(GardenStyle::Modern));

        inputs.reference_image = Some(EncodedImage::new("image/png", "UkVG"));
        assert_eq!(inputs.effective_style(), None);

        inputs.style = Some(GardenStyle::Desert);
        assert_eq!(inputs.effective_style(), Some(GardenStyle::Desert));
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        let limited = SessionError::from(LlmError::RateLimited {
            retry_after: Duration::from_secs(30),
        });
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(30)));
        assert_eq!(SessionError::from(LlmError::NoDesign).retry_after(), None);
        assert_eq!(SessionError::NoYardPhoto.retry_after(), None);
    }

    #[test]
    fn test_architect_error_is_transparent() {
        let err = SessionError::from(LlmError::NoDesign);
        assert_eq!(
            err.to_string(),
            "The AI Architect could not generate a design. Please try a different photo or description."
        );
    }
}
