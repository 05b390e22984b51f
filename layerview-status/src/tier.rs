use serde::Serialize;
use std::fmt;

/// Rendering tier of a classified status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    Ok,
    Warning,
    Error,
    Running,
    Pending,
}

impl StatusTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Running => "running",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tier plus the operator-facing title shown next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: StatusTier,
    pub title: &'static str,
}

impl Classification {
    pub const fn new(tier: StatusTier, title: &'static str) -> Self {
        Self { tier, title }
    }
}

/// Icon shown on a hook badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookIcon {
    Check,
    Cross,
    Circle,
    Dash,
}

impl HookIcon {
    /// Plain-text form of the icon.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Check => "OK",
            Self::Cross => "X",
            Self::Circle => "...",
            Self::Dash => "?",
        }
    }
}
