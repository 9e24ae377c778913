//! Error types for the avatar stage.

/// Errors surfaced to the embedding caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StageError {
    /// Width or height was zero
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// The graphics subsystem could not provide a surface
    #[error("Graphics subsystem error: {reason}")]
    Graphics { reason: String },

    /// The platform could not schedule a frame callback
    #[error("Frame scheduler error: {reason}")]
    Scheduler { reason: String },

    /// A render context was used after it was disposed
    #[error("Render context used after dispose: {operation}")]
    Disposed { operation: &'static str },
}

impl StageError {
    pub fn graphics(reason: impl Into<String>) -> Self {
        Self::Graphics {
            reason: reason.into(),
        }
    }

    pub fn scheduler(reason: impl Into<String>) -> Self {
        Self::Scheduler {
            reason: reason.into(),
        }
    }

    /// Fatal errors leave the widget without a live render context.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Graphics { .. } | Self::Scheduler { .. })
    }
}

/// Failure reported by an asset source. Never returned to the caller: the host
/// logs it and shows the fallback geometry instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AssetError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl AssetError {
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. } | Self::Parse { url, .. } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_platform_errors_are_fatal() {
        assert!(StageError::graphics("no adapter").is_fatal());
        assert!(StageError::scheduler("requestFrame threw").is_fatal());
        assert!(!StageError::InvalidSize {
            width: 0,
            height: 10
        }
        .is_fatal());
        assert!(!StageError::Disposed { operation: "resize" }.is_fatal());
    }

    #[test]
    fn asset_error_messages_carry_url() {
        let err = AssetError::fetch("a.glb", "404");
        assert_eq!(err.url(), "a.glb");
        assert_eq!(err.to_string(), "Failed to fetch a.glb: 404");
    }
}
