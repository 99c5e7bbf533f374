use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);
const SWEEP_EVERY: Duration = Duration::from_secs(300);

#[derive(Clone, Copy)]
struct Window {
    opened: Instant,
    used: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { opened: now, used: 0 }
    }

    /// Seconds until the window reopens, or `None` if another request fits.
    fn exhausted(&mut self, now: Instant, length: Duration, limit: u32) -> Option<u64> {
        let elapsed = now.duration_since(self.opened);
        if elapsed > length {
            *self = Self::new(now);
            return None;
        }
        (self.used >= limit).then(|| length.saturating_sub(elapsed).as_secs())
    }
}

#[derive(Clone, Copy)]
struct ClientWindows {
    minute: Window,
    hour: Window,
}

/// Fixed-window per-IP limiter for the paid generative endpoints.
#[derive(Clone)]
pub struct RateLimiter {
    clients: Arc<DashMap<IpAddr, ClientWindows>>,
    last_sweep: Arc<Mutex<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
            per_minute,
            per_hour,
        }
    }

    pub fn check_rate_limit(&self, ip: IpAddr) -> Result<(), RateLimitError> {
        self.sweep_stale();

        let now = Instant::now();
        let mut windows = self.clients.entry(ip).or_insert_with(|| ClientWindows {
            minute: Window::new(now),
            hour: Window::new(now),
        });

        if let Some(wait) = windows.minute.exhausted(now, MINUTE, self.per_minute) {
            return Err(RateLimitError::TooManyRequestsPerMinute(wait));
        }
        if let Some(wait) = windows.hour.exhausted(now, HOUR, self.per_hour) {
            return Err(RateLimitError::TooManyRequestsPerHour(wait));
        }

        windows.minute.used += 1;
        windows.hour.used += 1;
        Ok(())
    }

    /// Drops clients whose hourly window closed. A poisoned lock skips the sweep.
    fn sweep_stale(&self) {
        let Ok(mut last_sweep) = self.last_sweep.lock() else {
            return;
        };
        if last_sweep.elapsed() < SWEEP_EVERY {
            return;
        }
        let now = Instant::now();
        self.clients
            .retain(|_, w| now.duration_since(w.hour.opened) <= HOUR);
        *last_sweep = now;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Too many requests. Try again in {0} seconds.")]
    TooManyRequestsPerMinute(u64),
    #[error("Hourly limit reached. Try again in {} minutes.", .0.div_ceil(60))]
    TooManyRequestsPerHour(u64),
}

impl From<RateLimitError> for restyle_errors::AppError {
    fn from(e: RateLimitError) -> Self {
        restyle_errors::AppError::RateLimited(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_minute_window_blocks_after_limit() {
        let limiter = RateLimiter::new(2, 10);
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        assert!(limiter.check_rate_limit(ip).is_ok());
        assert!(limiter.check_rate_limit(ip).is_ok());
        assert!(matches!(
            limiter.check_rate_limit(ip),
            Err(RateLimitError::TooManyRequestsPerMinute(_))
        ));
    }

    #[test]
    fn test_limits_are_per_ip() {
        let limiter = RateLimiter::new(1, 10);
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(limiter.check_rate_limit(a).is_ok());
        assert!(limiter.check_rate_limit(a).is_err());
        assert!(limiter.check_rate_limit(b).is_ok());
    }

    #[test]
    fn test_hour_window() {
        let limiter = RateLimiter::new(10, 1);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);

        assert!(limiter.check_rate_limit(ip).is_ok());
        assert!(matches!(
            limiter.check_rate_limit(ip),
            Err(RateLimitError::TooManyRequestsPerHour(_))
        ));
    }

    #[test]
    fn test_hourly_message_rounds_up_to_minutes() {
        assert_eq!(
            RateLimitError::TooManyRequestsPerHour(61).to_string(),
            "Hourly limit reached. Try again in 2 minutes."
        );
    }
}
