use log::{debug, error, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Pedantic,
    Warning,
    Error,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub tag: Option<String>,
    pub message: String,
}

/// Collects every finding of a build. Each one is logged as it comes in.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    show_pedantic: bool,
}

impl Diagnostics {
    pub fn new(show_pedantic: bool) -> Self {
        Diagnostics {
            entries: Vec::new(),
            show_pedantic,
        }
    }

    pub fn report(&mut self, severity: Severity, tag: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        let prefix = tag.map(|tag| format!("{}: ", tag)).unwrap_or_default();
        match severity {
            Severity::Fatal | Severity::Error => error!("{}{}", prefix, message),
            Severity::Warning => warn!("{}{}", prefix, message),
            Severity::Pedantic if self.show_pedantic => warn!("{}{}", prefix, message),
            Severity::Pedantic => debug!("{}{}", prefix, message),
        }

        self.entries.push(Diagnostic {
            severity,
            tag: tag.map(str::to_owned),
            message,
        });
    }

    pub fn pedantic(&mut self, tag: &str, message: impl Into<String>) {
        self.report(Severity::Pedantic, Some(tag), message);
    }

    pub fn warning(&mut self, tag: &str, message: impl Into<String>) {
        self.report(Severity::Warning, Some(tag), message);
    }

    pub fn error(&mut self, tag: &str, message: impl Into<String>) {
        self.report(Severity::Error, Some(tag), message);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|entry| entry.severity == severity).count()
    }
}
