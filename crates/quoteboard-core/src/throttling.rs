use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{InsufficientCapacity, Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side budget for upstream calls. Exhaustion fails fast; nothing is queued or retried.
#[derive(Clone)]
pub struct RateGuard {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl RateGuard {
    /// Allow `quota_limit` calls per `quota_window`, all of them available as a burst.
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let clock = DefaultClock::default();
        Self {
            limiter: Arc::new(RateLimiter::direct_with_clock(
                quota_from_window(quota_window, quota_limit),
                &clock,
            )),
            clock,
        }
    }

    /// Alpha Vantage free tier: 5 calls per minute.
    pub fn per_minute(quota_limit: u32) -> Self {
        Self::new(Duration::from_secs(60), quota_limit)
    }

    /// Take `calls` units of budget at once, or none of them.
    pub fn acquire_n(&self, calls: u32) -> Result<(), BudgetDenied> {
        let Some(calls) = NonZeroU32::new(calls) else {
            return Ok(());
        };

        match self.limiter.check_n(calls) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(not_until)) => Err(BudgetDenied::RetryAfter(
                not_until.wait_time_from(self.clock.now()),
            )),
            Err(InsufficientCapacity(burst)) => Err(BudgetDenied::ExceedsBurst {
                requested: calls.get(),
                burst,
            }),
        }
    }
}

/// Why [`RateGuard::acquire_n`] refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDenied {
    /// Budget is spent; this much must pass before the request fits.
    RetryAfter(Duration),
    /// The request needs more calls than the window ever allows.
    ExceedsBurst { requested: u32, burst: u32 },
}

impl std::fmt::Display for BudgetDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RetryAfter(wait) => {
                write!(f, "request budget exhausted; retry in {:.2}s", wait.as_secs_f64())
            }
            Self::ExceedsBurst { requested, burst } => write!(
                f,
                "request needs {requested} upstream calls but the budget allows {burst} per window"
            ),
        }
    }
}

impl std::fmt::Debug for RateGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGuard").finish_non_exhaustive()
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let burst = NonZeroU32::new(quota_limit.max(1)).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(burst.get())).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
