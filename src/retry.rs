// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Rate-limit backoff for GitHub API calls.
///
/// GitHub reports quota exhaustion together with a reset timestamp. The
/// helpers here turn that timestamp into a bounded wait and cap how many times
/// the same request is re-attempted.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

use crate::source::{RateLimitCategory, WorkflowSource};

/// Configuration for waiting out an exhausted request quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default)]
pub struct RateLimitPolicy
{
    /// Seconds added on top of the reset timestamp (default: 5).
    pub safety_margin_secs: u64,
    /// Maximum number of re-attempts of one repository (default: 3).
    pub max_retries:        u32,
}

impl Default for RateLimitPolicy
{
    fn default() -> Self
    {
        Self {
            safety_margin_secs: 5, max_retries: 3,
        }
    }
}

impl RateLimitPolicy
{
    /// Computes how long to wait for a quota resetting at `reset_epoch`.
    ///
    /// The result saturates at zero when the reset lies in the past.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use wfharvest::RateLimitPolicy;
    ///
    /// let policy = RateLimitPolicy::default();
    /// assert_eq!(policy.wait_duration(1_000, 990,), Duration::from_secs(15));
    /// assert_eq!(policy.wait_duration(1_000, 2_000,), Duration::ZERO);
    /// ```
    pub fn wait_duration(&self, reset_epoch: u64, now_epoch: u64,) -> Duration
    {
        let resume_at = reset_epoch.saturating_add(self.safety_margin_secs,);
        Duration::from_secs(resume_at.saturating_sub(now_epoch,),)
    }

    /// Asks the source when `category` resets and sleeps until then.
    ///
    /// When the reset timestamp cannot be fetched only the safety margin is
    /// waited. Returns the duration slept.
    pub async fn wait_for_reset<S,>(&self, source: &S, category: RateLimitCategory,) -> Duration
    where
        S: WorkflowSource,
    {
        let wait = match source.rate_limit_reset(category,).await {
            Ok(reset,) => self.wait_duration(reset, unix_now(),),
            Err(error,) => {
                warn!("Could not read {} rate limit reset: {}", category, error);
                Duration::from_secs(self.safety_margin_secs,)
            }
        };

        warn!("{} rate limit exceeded. Waiting for {} seconds...", category, wait.as_secs());
        sleep(wait,).await;
        wait
    }
}

/// Current Unix time in seconds; a clock before the epoch reads as zero.
pub fn unix_now() -> u64
{
    SystemTime::now().duration_since(UNIX_EPOCH,).map(|elapsed| elapsed.as_secs(),).unwrap_or(0,)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn rate_limit_policy_default_values()
    {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.safety_margin_secs, 5);
        assert_eq!(policy.max_retries, 3);
    }

    #[test]
    fn wait_duration_adds_safety_margin()
    {
        let policy =
            RateLimitPolicy {
                safety_margin_secs: 5, max_retries: 1,
            };
        assert_eq!(policy.wait_duration(100, 40,), Duration::from_secs(65));
    }

    #[test]
    fn wait_duration_saturates_for_past_resets()
    {
        let policy =
            RateLimitPolicy {
                safety_margin_secs: 0, max_retries: 1,
            };
        assert_eq!(policy.wait_duration(10, 50,), Duration::ZERO);
        assert_eq!(policy.wait_duration(u64::MAX, 0,), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn policy_deserializes_partial_yaml()
    {
        let policy: RateLimitPolicy =
            serde_yaml::from_str("max_retries: 7",).expect("valid policy",);
        assert_eq!(policy.max_retries, 7);
        assert_eq!(policy.safety_margin_secs, 5);
    }

    #[test]
    fn unix_now_is_after_2020()
    {
        assert!(unix_now() > 1_577_836_800);
    }
}
