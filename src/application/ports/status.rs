//! Status reporting port interface

/// Kind of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Loading,
    Success,
    Error,
}

impl StatusKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Port for surfacing progress and outcome messages to the user
pub trait StatusReporter: Send + Sync {
    fn report(&self, kind: StatusKind, message: &str);
}

impl<T: StatusReporter + ?Sized> StatusReporter for &T {
    fn report(&self, kind: StatusKind, message: &str) {
        (**self).report(kind, message)
    }
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl StatusReporter for SilentReporter {
    fn report(&self, _kind: StatusKind, _message: &str) {}
}
