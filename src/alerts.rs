//! User-facing notifications raised when an operation fails

use std::sync::{Mutex, PoisonError};

use crate::styled::{Palette, Styles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub detail: String,
}

impl Alert {
    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Error,
            title: title.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Warning,
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Where alerts are shown. The chat loop prints them; tests record them.
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}

/// Prints alerts to stderr so they never mix with command output
#[derive(Debug, Clone, Copy)]
pub struct StderrAlerts {
    palette: Palette,
}

impl Default for StderrAlerts {
    fn default() -> Self {
        Self {
            palette: Palette::stderr(),
        }
    }
}

impl AlertSink for StderrAlerts {
    fn alert(&self, alert: Alert) {
        let (label, style) = match alert.level {
            AlertLevel::Warning => ("warning", Styles::warning()),
            AlertLevel::Error => ("error", Styles::error()),
        };
        eprintln!(
            "{} {}: {}",
            self.palette.paint(style.bold(), label),
            alert.title,
            alert.detail
        );
    }
}

/// Keeps alerts in memory
#[derive(Debug, Default)]
pub struct MemoryAlerts {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlerts {
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AlertSink for MemoryAlerts {
    fn alert(&self, alert: Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert);
    }
}
