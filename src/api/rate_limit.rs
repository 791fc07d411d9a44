//! Rate Limiting for Peer Registration
//!
//! A public boot node takes unauthenticated writes, so registration is
//! limited per source IP with a sliding window. IPs that keep blowing
//! through the limit are temporarily banned.

use std::collections::HashMap;
use std::net::IpAddr;
use tracing::{debug, warn};

use crate::types::current_timestamp;

/// Window size in seconds
const WINDOW_SECS: u64 = 60;

/// Per-IP rate limiter for registration requests
pub struct RateLimiter {
    /// Request counts per IP
    entries: HashMap<IpAddr, IpEntry>,

    /// Maximum requests per window
    max_per_minute: u32,

    /// Limit violations before a temporary ban
    max_violations: u32,

    /// Ban duration in seconds
    ban_duration: u64,
}

struct IpEntry {
    /// Requests in current window
    request_count: u32,

    /// Window start time
    window_start: u64,

    /// Times the limit was exceeded
    violations: u32,

    /// Ban expiry time, if banned
    ban_until: Option<u64>,
}

impl RateLimiter {
    pub fn new(max_per_minute: u32, max_violations: u32, ban_duration: u64) -> Self {
        Self {
            entries: HashMap::new(),
            max_per_minute,
            max_violations,
            ban_duration,
        }
    }

    /// Check whether a registration from this IP is allowed
    pub fn allow(&mut self, ip: IpAddr) -> bool {
        let now = current_timestamp();

        let entry = self.entries.entry(ip).or_insert_with(|| IpEntry {
            request_count: 0,
            window_start: now,
            violations: 0,
            ban_until: None,
        });

        if let Some(ban_until) = entry.ban_until {
            if now < ban_until {
                debug!("IP {} is banned until {}", ip, ban_until);
                return false;
            }
            entry.ban_until = None;
            entry.violations = 0;
        }

        if now >= entry.window_start + WINDOW_SECS {
            entry.window_start = now;
            entry.request_count = 0;
        }

        entry.request_count += 1;

        if entry.request_count > self.max_per_minute {
            entry.violations += 1;
            warn!(
                "Rate limit exceeded for {}: {} requests, violation #{}",
                ip, entry.request_count, entry.violations
            );

            if entry.violations >= self.max_violations {
                entry.ban_until = Some(now + self.ban_duration);
                warn!("IP {} banned for {} seconds", ip, self.ban_duration);
            }

            return false;
        }

        true
    }

    /// Check if an IP is currently banned
    pub fn is_banned(&self, ip: &IpAddr) -> bool {
        self.entries
            .get(ip)
            .and_then(|e| e.ban_until)
            .map(|t| current_timestamp() < t)
            .unwrap_or(false)
    }

    /// Number of tracked IPs
    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }

    /// Drop stale tracking entries to bound memory growth.
    ///
    /// Keeps IPs that are still banned or had activity within the last
    /// few windows.
    pub fn cleanup(&mut self) {
        let now = current_timestamp();
        let cutoff = now.saturating_sub(WINDOW_SECS * 10);

        self.entries.retain(|_, entry| {
            entry.ban_until.map(|t| now < t).unwrap_or(false) || entry.window_start > cutoff
        });
    }
}
