//! Transient notices (toasts) and the boot shell.

use std::time::{Duration, Instant};

/// Shown when boot failed partway, so the user isn't left looking at a loader.
pub const PARTIAL_LOAD_BANNER: &str = "Partial load: interface shown to avoid stuck loader";

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::AsRefStr, strum::Display)]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub level: Level,
    pub message: String,
    posted: Instant,
}

/// Notices on screen. Each one expires after a fixed time.
pub struct Notices {
    duration: Duration,
    queue: std::collections::VecDeque<Notice>,
}
impl Default for Notices {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}
impl Notices {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            queue: std::collections::VecDeque::new(),
        }
    }
    pub fn post(&mut self, level: Level, message: impl Into<String>) {
        self.post_at(level, message, Instant::now());
    }
    pub fn post_at(&mut self, level: Level, message: impl Into<String>, now: Instant) {
        let message = message.into();
        match level {
            Level::Info => log::info!("notice: {message}"),
            Level::Warn => log::warn!("notice: {message}"),
            Level::Error => log::error!("notice: {message}"),
        }
        self.queue.push_back(Notice {
            level,
            message,
            posted: now,
        });
    }
    pub fn info(&mut self, message: impl Into<String>) {
        self.post(Level::Info, message);
    }
    pub fn warn(&mut self, message: impl Into<String>) {
        self.post(Level::Warn, message);
    }
    pub fn error(&mut self, message: impl Into<String>) {
        self.post(Level::Error, message);
    }
    /// Drop notices that have been up for their full duration.
    pub fn expire(&mut self, now: Instant) {
        // Posted in order, so expired ones are all at the front.
        while self
            .queue
            .front()
            .is_some_and(|notice| now.saturating_duration_since(notice.posted) >= self.duration)
        {
            self.queue.pop_front();
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = &Notice> + '_ {
        self.queue.iter()
    }
    #[must_use]
    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// The page around the editor: a loading overlay until boot ends, and an optional banner.
#[derive(Debug)]
pub struct Shell {
    loading: bool,
    banner: Option<String>,
}
impl Default for Shell {
    fn default() -> Self {
        Self {
            loading: true,
            banner: None,
        }
    }
}
impl Shell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Hide the loader. Idempotent.
    pub fn reveal(&mut self) {
        if self.loading {
            log::debug!("shell revealed");
        }
        self.loading = false;
    }
    pub fn show_banner(&mut self, text: impl Into<String>) {
        self.banner = Some(text.into());
    }
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }
    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }
}
