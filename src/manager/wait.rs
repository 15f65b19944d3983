//! Bounded status polling.

use std::fmt;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::control_plane::{ControlPlane, InstanceStatus};

use super::InstanceManager;

const DEFAULT_MAX_ATTEMPTS: u32 = 60;
const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Fixed-interval polling budget.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Number of status queries before giving up.
    pub max_attempts: u32,
    /// Delay between consecutive queries.
    pub interval: Duration,
}

impl RetryPolicy {
    /// Builds a policy from an attempt budget and interval.
    #[must_use]
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INTERVAL)
    }
}

/// Result of a polling loop. Polling never raises; failures are logged and
/// reported here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WaitOutcome {
    /// The instance reported `available`.
    Available,
    /// The instance is no longer reported by the provider.
    Gone,
    /// The attempt budget ran out.
    Exhausted {
        /// Number of queries made.
        attempts: u32,
    },
    /// The instance reached a status from which it cannot become available.
    Terminal {
        /// Status that ended the wait.
        status: InstanceStatus,
    },
    /// A status query failed or the instance disappeared while waiting for it.
    Failed {
        /// Human readable description of the failure.
        cause: String,
    },
}

impl WaitOutcome {
    /// Returns true when the awaited condition was observed.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Available | Self::Gone)
    }
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("instance is available"),
            Self::Gone => f.write_str("instance is gone"),
            Self::Exhausted { attempts } => write!(f, "gave up after {attempts} status checks"),
            Self::Terminal { status } => write!(f, "instance reached status {status}"),
            Self::Failed { cause } => write!(f, "status check failed: {cause}"),
        }
    }
}

impl<P: ControlPlane> InstanceManager<P> {
    /// Polls until the instance reports `available` or the budget runs out.
    ///
    /// The first query is immediate; later queries are spaced by
    /// `policy.interval`. Exactly `policy.max_attempts` queries are made when
    /// the instance never becomes available. A failed query, a missing
    /// instance, or a status such as `failed` ends the wait early.
    pub async fn await_available(&self, identifier: &str, policy: RetryPolicy) -> WaitOutcome {
        info!(
            operation = "await_available",
            identifier,
            max_attempts = policy.max_attempts,
            "waiting for instance to become available"
        );

        for attempt in 1..=policy.max_attempts {
            if attempt > 1 {
                sleep(policy.interval).await;
            }

            let status = match self.query_status(identifier).await {
                Ok(Some(status)) => status,
                Ok(None) => {
                    let cause = format!("instance {identifier} not found");
                    error!(operation = "await_available", identifier, %cause, "wait failed");
                    return WaitOutcome::Failed { cause };
                }
                Err(cause) => {
                    error!(operation = "await_available", identifier, %cause, "wait failed");
                    return WaitOutcome::Failed { cause };
                }
            };

            if status == InstanceStatus::Available {
                info!(
                    operation = "await_available",
                    identifier, attempt, "instance is available"
                );
                return WaitOutcome::Available;
            }

            if status.cannot_become_available() {
                error!(
                    operation = "await_available",
                    identifier,
                    %status,
                    "instance cannot become available"
                );
                return WaitOutcome::Terminal { status };
            }

            debug!(
                operation = "await_available",
                identifier,
                attempt,
                %status,
                "instance not yet available"
            );
        }

        warn!(
            operation = "await_available",
            identifier,
            attempts = policy.max_attempts,
            "instance did not become available in time"
        );
        WaitOutcome::Exhausted {
            attempts: policy.max_attempts,
        }
    }

    /// Polls until the provider no longer reports the instance.
    pub async fn await_deleted(&self, identifier: &str, policy: RetryPolicy) -> WaitOutcome {
        info!(
            operation = "await_deleted",
            identifier,
            max_attempts = policy.max_attempts,
            "waiting for instance to disappear"
        );

        for attempt in 1..=policy.max_attempts {
            if attempt > 1 {
                sleep(policy.interval).await;
            }

            match self.query_status(identifier).await {
                Ok(None) => {
                    info!(operation = "await_deleted", identifier, attempt, "instance is gone");
                    return WaitOutcome::Gone;
                }
                Ok(Some(status)) => {
                    debug!(
                        operation = "await_deleted",
                        identifier,
                        attempt,
                        %status,
                        "instance still present"
                    );
                }
                Err(cause) => {
                    error!(operation = "await_deleted", identifier, %cause, "wait failed");
                    return WaitOutcome::Failed { cause };
                }
            }
        }

        warn!(
            operation = "await_deleted",
            identifier,
            attempts = policy.max_attempts,
            "instance still present after wait"
        );
        WaitOutcome::Exhausted {
            attempts: policy.max_attempts,
        }
    }

    async fn query_status(&self, identifier: &str) -> Result<Option<InstanceStatus>, String> {
        self.plane
            .find_instances(&self.settings.region, identifier)
            .await
            .map(|records| {
                records
                    .into_iter()
                    .find(|record| record.identifier == identifier)
                    .map(|record| record.status)
            })
            .map_err(|err| err.to_string())
    }
}
