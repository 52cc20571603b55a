use std::fmt;
use std::sync::mpsc;

/// Where a backend diagnostic originated.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DebugSource {
    Api,
    WindowSystem,
    ShaderCompiler,
    ThirdParty,
    Application,
    Other,
}

/// What a backend diagnostic is about. Only `Error` is treated as a failure.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DebugKind {
    Error,
    DeprecatedBehavior,
    UndefinedBehavior,
    Portability,
    Performance,
    Marker,
    PushGroup,
    PopGroup,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DebugSeverity {
    Notification,
    Low,
    Medium,
    High,
}

/// A diagnostic reported by the graphics backend outside any call's return value.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugMessage {
    /// Backend-specific message id; used to silence known-noisy messages.
    pub id: u32,
    pub source: DebugSource,
    pub kind: DebugKind,
    pub severity: DebugSeverity,
    pub text: String,
}

/// Sending half of the diagnostic channel handed to a device.
///
/// Devices may report from any thread; the lifecycle drains the receiver on
/// the main thread between phases of a frame.
pub type DebugSink = mpsc::Sender<DebugMessage>;

impl DebugMessage {
    pub fn new(
        id: u32,
        source: DebugSource,
        kind: DebugKind,
        severity: DebugSeverity,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            source,
            kind,
            severity,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == DebugKind::Error
    }

    /// Log level matching the message severity.
    pub fn level(&self) -> log::Level {
        match self.severity {
            DebugSeverity::High => log::Level::Error,
            DebugSeverity::Medium => log::Level::Warn,
            DebugSeverity::Low => log::Level::Info,
            DebugSeverity::Notification => log::Level::Debug,
        }
    }
}

impl fmt::Display for DebugSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DebugSource::Api => "API",
            DebugSource::WindowSystem => "Window Manager",
            DebugSource::ShaderCompiler => "Shader Compiler",
            DebugSource::ThirdParty => "Third Party",
            DebugSource::Application => "Application",
            DebugSource::Other => "Other",
        })
    }
}

impl fmt::Display for DebugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DebugKind::Error => "Error",
            DebugKind::DeprecatedBehavior => "Deprecated Behaviour",
            DebugKind::UndefinedBehavior => "Undefined Behaviour",
            DebugKind::Portability => "Portability",
            DebugKind::Performance => "Performance",
            DebugKind::Marker => "Marker",
            DebugKind::PushGroup => "Push Group",
            DebugKind::PopGroup => "Pop Group",
            DebugKind::Other => "Other",
        })
    }
}

impl fmt::Display for DebugSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DebugSeverity::High => "high",
            DebugSeverity::Medium => "medium",
            DebugSeverity::Low => "low",
            DebugSeverity::Notification => "notification",
        })
    }
}

impl fmt::Display for DebugMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\nSource: {}\nType: {}\nSeverity: {}",
            self.text, self.source, self.kind, self.severity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_source_type_and_severity() {
        let msg = DebugMessage::new(
            7,
            DebugSource::Api,
            DebugKind::Error,
            DebugSeverity::High,
            "buffer is too small",
        );

        assert_eq!(
            msg.to_string(),
            "buffer is too small\nSource: API\nType: Error\nSeverity: high"
        );
    }

    #[test]
    fn level_follows_severity() {
        let mut msg = DebugMessage::new(
            1,
            DebugSource::Other,
            DebugKind::Performance,
            DebugSeverity::Notification,
            "",
        );
        assert_eq!(msg.level(), log::Level::Debug);
        assert!(!msg.is_error());

        msg.severity = DebugSeverity::Medium;
        assert_eq!(msg.level(), log::Level::Warn);
    }
}
