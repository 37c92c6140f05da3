//! Pacing between polling steps
//!
//! A [`Timeout`] either sleeps for a fixed duration or hands control to a
//! caller-supplied [`PauseAction`] together with arguments bound when the
//! timeout was built.

use crate::error::{Error, Result};
use crate::types::{JsonValue, PauseArgs};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Pause used by a client that was not given one
pub const DEFAULT_PAUSE_SECS: u64 = 15;

/// A caller-supplied pause strategy
///
/// Any `FnMut(&PauseArgs) + Send` closure is a `PauseAction`; implement the
/// trait directly for strategies that need to await.
#[async_trait]
pub trait PauseAction: Send {
    /// Pause the polling loop
    async fn pause(&mut self, args: &PauseArgs);
}

#[async_trait]
impl<F> PauseAction for F
where
    F: FnMut(&PauseArgs) + Send,
{
    async fn pause(&mut self, args: &PauseArgs) {
        self(args);
    }
}

/// How a timeout pauses, resolved once at construction
pub enum PacingPolicy {
    /// Sleep for a fixed duration
    Fixed(Duration),
    /// Run an action with pre-bound arguments
    Action {
        /// The pause strategy
        action: Box<dyn PauseAction>,
        /// Arguments passed on every pause
        args: PauseArgs,
    },
}

impl fmt::Debug for PacingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(duration) => f.debug_tuple("Fixed").field(duration).finish(),
            Self::Action { args, .. } => f
                .debug_struct("Action")
                .field("args", args)
                .finish_non_exhaustive(),
        }
    }
}

/// Pacing primitive invoked after every successful step
#[derive(Debug)]
pub struct Timeout {
    policy: PacingPolicy,
}

impl Timeout {
    /// Create a timeout from a resolved policy
    pub fn new(policy: PacingPolicy) -> Self {
        Self { policy }
    }

    /// Sleep for `seconds` on every pause
    ///
    /// Negative or non-finite values are rejected.
    pub fn from_secs(seconds: f64) -> Result<Self> {
        Ok(Self::new(PacingPolicy::Fixed(seconds_to_duration(seconds)?)))
    }

    /// Sleep for `duration` on every pause
    pub fn from_duration(duration: Duration) -> Self {
        Self::new(PacingPolicy::Fixed(duration))
    }

    /// Run `action` with `args` on every pause
    pub fn from_action(action: impl PauseAction + 'static, args: PauseArgs) -> Self {
        Self::new(PacingPolicy::Action {
            action: Box::new(action),
            args,
        })
    }

    /// Start building a timeout from optional parts
    pub fn builder() -> TimeoutBuilder {
        TimeoutBuilder::default()
    }

    /// Get the resolved policy
    pub fn policy(&self) -> &PacingPolicy {
        &self.policy
    }

    /// Block the polling flow according to the policy
    pub async fn pause(&mut self) {
        match &mut self.policy {
            PacingPolicy::Fixed(duration) => {
                debug!("Pausing for {:?}", duration);
                tokio::time::sleep(*duration).await;
            }
            PacingPolicy::Action { action, args } => {
                debug!("Pausing with custom action");
                action.pause(args).await;
            }
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::from_duration(Duration::from_secs(DEFAULT_PAUSE_SECS))
    }
}

/// Builder accepting a duration, an action, or both
///
/// When both are set the fixed duration wins.
#[derive(Default)]
pub struct TimeoutBuilder {
    seconds: Option<f64>,
    action: Option<Box<dyn PauseAction>>,
    args: PauseArgs,
}

impl TimeoutBuilder {
    /// Set the fixed pause in seconds
    #[must_use]
    pub fn seconds(mut self, seconds: f64) -> Self {
        self.seconds = Some(seconds);
        self
    }

    /// Set the pause action
    #[must_use]
    pub fn action(mut self, action: impl PauseAction + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// Bind a named argument for the pause action
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Resolve the configured parts into a timeout
    pub fn build(self) -> Result<Timeout> {
        match (self.seconds, self.action) {
            (Some(seconds), action) => {
                if action.is_some() {
                    debug!("Both a pause duration and a pause action set, using the duration");
                }
                Timeout::from_secs(seconds)
            }
            (None, Some(action)) => Ok(Timeout::new(PacingPolicy::Action {
                action,
                args: self.args,
            })),
            (None, None) => Err(Error::config(
                "Either a pause duration or a pause action must be set",
            )),
        }
    }
}

impl fmt::Debug for TimeoutBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutBuilder")
            .field("seconds", &self.seconds)
            .field("has_action", &self.action.is_some())
            .field("args", &self.args)
            .finish()
    }
}

fn seconds_to_duration(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(Error::config(format!(
            "Pause duration must be a non-negative number of seconds, got {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| Error::config(format!("Invalid pause duration {seconds}: {e}")))
}
