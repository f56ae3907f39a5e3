//! Shared HTTP dispatch logic for the vendor adapters.
//!
//! Each adapter builds its own vendor-specific request and extracts its own
//! vendor-specific response body; the deadline handling, retry-once-on-rate-limit,
//! and status-code classification in spec.md §4.1 are identical across
//! vendors and live here so the three adapters don't reimplement them.

use crate::core::types::ProviderStatus;
use std::time::{Duration, Instant};

/// Outcome of one dispatched HTTP call, before vendor-specific body parsing.
pub(crate) enum HttpOutcome {
    /// HTTP 2xx with a body.
    Success { body: String, latency: Duration },
    /// Any terminal, typed failure.
    Failed {
        status: ProviderStatus,
        latency: Duration,
    },
}

/// Classify an HTTP status code + body the way spec.md §4.1 requires.
/// 429 is ambiguous between rate limiting and quota/billing exhaustion;
/// vendors signal the distinction in the body text.
pub(crate) fn classify_status(status: u16, body: &str) -> ProviderStatus {
    match status {
        401 | 403 => ProviderStatus::AuthErr,
        429 => {
            let lower = body.to_ascii_lowercase();
            if lower.contains("quota") || lower.contains("billing") || lower.contains("insufficient_quota")
            {
                ProviderStatus::QuotaErr
            } else {
                ProviderStatus::RateLimitErr
            }
        }
        500..=599 => ProviderStatus::ServerErr,
        _ => ProviderStatus::ServerErr,
    }
}

/// Send `request`, retrying exactly once on a rate-limit classification if
/// `max_retries > 0`, never exceeding `deadline`. `request` must be clonable
/// (every adapter builds its request from an owned, reusable body).
pub(crate) async fn dispatch(
    client: &reqwest::Client,
    build_request: impl Fn() -> reqwest::RequestBuilder,
    deadline: Duration,
    max_retries: u32,
) -> HttpOutcome {
    let start = Instant::now();
    let outcome = send_once(client, build_request(), deadline).await;

    let outcome = match outcome {
        HttpOutcome::Failed {
            status: ProviderStatus::RateLimitErr,
            ..
        } if max_retries > 0 => {
            let elapsed = start.elapsed();
            if elapsed >= deadline {
                HttpOutcome::Failed {
                    status: ProviderStatus::TimeoutErr,
                    latency: deadline,
                }
            } else {
                let backoff = Duration::from_millis(50 + rand::random::<u64>() % 150);
                let remaining = deadline.saturating_sub(elapsed);
                tokio::time::sleep(backoff.min(remaining)).await;
                let remaining = deadline.saturating_sub(start.elapsed());
                send_once(client, build_request(), remaining).await
            }
        }
        other => other,
    };

    match outcome {
        HttpOutcome::Success { body, .. } => HttpOutcome::Success {
            body,
            latency: start.elapsed(),
        },
        HttpOutcome::Failed { status, .. } => HttpOutcome::Failed {
            status,
            latency: start.elapsed(),
        },
    }
}

async fn send_once(
    client: &reqwest::Client,
    request: reqwest::RequestBuilder,
    deadline: Duration,
) -> HttpOutcome {
    if deadline.is_zero() {
        return HttpOutcome::Failed {
            status: ProviderStatus::TimeoutErr,
            latency: Duration::ZERO,
        };
    }

    let send_fut = request.send();
    match tokio::time::timeout(deadline, send_fut).await {
        Err(_elapsed) => HttpOutcome::Failed {
            status: ProviderStatus::TimeoutErr,
            latency: deadline,
        },
        Ok(Err(e)) => {
            let status = if e.is_timeout() {
                ProviderStatus::TimeoutErr
            } else if e.is_connect() || e.is_request() {
                ProviderStatus::TransportErr
            } else {
                ProviderStatus::TransportErr
            };
            HttpOutcome::Failed {
                status,
                latency: Duration::ZERO,
            }
        }
        Ok(Ok(response)) => {
            let status_code = response.status().as_u16();
            match response.text().await {
                Ok(body) if status_code < 300 => {
                    if body.trim().is_empty() {
                        HttpOutcome::Failed {
                            status: ProviderStatus::ParseUnavailable,
                            latency: Duration::ZERO,
                        }
                    } else {
                        HttpOutcome::Success {
                            body,
                            latency: Duration::ZERO,
                        }
                    }
                }
                Ok(body) => HttpOutcome::Failed {
                    status: classify_status(status_code, &body),
                    latency: Duration::ZERO,
                },
                Err(_) => HttpOutcome::Failed {
                    status: ProviderStatus::ParseUnavailable,
                    latency: Duration::ZERO,
                },
            }
        }
    }
}
