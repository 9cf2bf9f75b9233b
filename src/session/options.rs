//! Session tuning.

use std::time::Duration;

use crate::incremental::ProvisionalPolicy;

/// Host-facing knobs for a [`crate::session::ParserSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Quiescence window before the confirming full reparse runs.
    pub idle_delay: Duration,
    /// The provisional-acceptance table used by the partial parser.
    pub policy: ProvisionalPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            idle_delay: Duration::from_millis(300),
            policy: ProvisionalPolicy::default(),
        }
    }
}

impl SessionOptions {
    pub fn with_idle_delay(mut self, idle_delay: Duration) -> SessionOptions {
        self.idle_delay = idle_delay;
        self
    }

    pub fn with_policy(mut self, policy: ProvisionalPolicy) -> SessionOptions {
        self.policy = policy;
        self
    }

    /// Accelerated delay used when a patch changed a span's context tag or
    /// left the tree speculative: downstream consumers should not sit on an
    /// approximate tree for a full idle window.
    pub(crate) fn confirm_delay(&self) -> Duration {
        self.idle_delay / 4
    }
}
