//! Pacing model for simulated token emission.
//!
//! Every delay is drawn from a normal distribution around the configured
//! mean, clipped to `[0.3 * mean, 1.7 * mean]` so sampled latencies stay
//! inside a bounded band around the target percentiles.

use crate::config::Config;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

/// Lower clip bound as a fraction of the mean.
const JITTER_FLOOR: f64 = 0.3;
/// Upper clip bound as a fraction of the mean.
const JITTER_CEIL: f64 = 1.7;

/// Truncated-normal jitter around the configured latency means.
///
/// A zero mean yields a zero delay; a zero standard deviation yields exactly
/// the mean. The RNG is the per-thread generator, so worker tasks never
/// contend on shared sampler state.
#[derive(Debug, Clone)]
pub struct LatencyModel {
    time_to_first_token: u64,
    time_to_first_token_std_dev: u64,
    inter_token_latency: u64,
    inter_token_latency_std_dev: u64,
    kv_cache_transfer_latency: u64,
    kv_cache_transfer_latency_std_dev: u64,
}

impl LatencyModel {
    pub fn new(config: &Config) -> Self {
        Self {
            time_to_first_token: config.time_to_first_token,
            time_to_first_token_std_dev: config.time_to_first_token_std_dev,
            inter_token_latency: config.inter_token_latency,
            inter_token_latency_std_dev: config.inter_token_latency_std_dev,
            kv_cache_transfer_latency: config.kv_cache_transfer_latency,
            kv_cache_transfer_latency_std_dev: config.kv_cache_transfer_latency_std_dev,
        }
    }

    /// Delay before the next streamed token.
    pub fn inter_token_latency(&self) -> Duration {
        jitter(self.inter_token_latency, self.inter_token_latency_std_dev)
    }

    /// Sum of `tokens` independent inter-token draws. Used by the
    /// non-streaming path to charge the full generation wall time up front.
    pub fn total_inter_token_latency(&self, tokens: usize) -> Duration {
        (0..tokens).map(|_| self.inter_token_latency()).sum()
    }

    /// Delay before the first token. When prefill already happened on a
    /// remote peer the KV-cache transfer pair replaces the TTFT pair.
    pub fn time_to_first_token(&self, remote_prefill: bool) -> Duration {
        if remote_prefill {
            jitter(
                self.kv_cache_transfer_latency,
                self.kv_cache_transfer_latency_std_dev,
            )
        } else {
            jitter(self.time_to_first_token, self.time_to_first_token_std_dev)
        }
    }
}

fn jitter(mean_ms: u64, std_dev_ms: u64) -> Duration {
    if mean_ms == 0 {
        return Duration::ZERO;
    }
    if std_dev_ms == 0 {
        return Duration::from_millis(mean_ms);
    }
    let mean = mean_ms as f64;
    let normal = Normal::new(mean, std_dev_ms as f64).expect("std dev checked non-zero");
    let drawn = normal.sample(&mut rand::thread_rng());
    let clipped = drawn.clamp(mean * JITTER_FLOOR, mean * JITTER_CEIL);
    Duration::from_secs_f64(clipped / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(mean: u64, std_dev: u64) -> LatencyModel {
        LatencyModel::new(&Config {
            inter_token_latency: mean,
            inter_token_latency_std_dev: std_dev,
            ..Config::default()
        })
    }

    #[test]
    fn zero_mean_is_zero_delay() {
        assert_eq!(model(0, 0).inter_token_latency(), Duration::ZERO);
        assert_eq!(model(0, 500).inter_token_latency(), Duration::ZERO);
    }

    #[test]
    fn zero_std_dev_is_exactly_the_mean() {
        for _ in 0..100 {
            assert_eq!(model(1000, 0).inter_token_latency(), Duration::from_millis(1000));
        }
    }

    #[test]
    fn draws_stay_inside_the_clip_band() {
        // Includes std devs close to and near the mean; clipping must hold
        // even for those.
        for std_dev in [300, 800, 900] {
            let m = model(1000, std_dev);
            for _ in 0..500 {
                let delay = m.inter_token_latency().as_secs_f64() * 1000.0;
                assert!(
                    (300.0..=1700.0).contains(&delay),
                    "std_dev {std_dev}: sampled {delay} ms out of band"
                );
            }
        }
    }

    #[test]
    fn total_latency_scales_with_token_count() {
        let m = model(1000, 300);
        for tokens in [5, 20, 100] {
            let total = m.total_inter_token_latency(tokens).as_secs_f64() * 1000.0;
            assert!(total >= 300.0 * tokens as f64);
            assert!(total <= 1700.0 * tokens as f64);
        }
    }

    #[test]
    fn total_latency_of_zero_tokens_is_zero() {
        assert_eq!(model(1000, 300).total_inter_token_latency(0), Duration::ZERO);
    }

    #[test]
    fn remote_prefill_selects_kv_transfer_pair() {
        let m = LatencyModel::new(&Config {
            time_to_first_token: 10_000,
            time_to_first_token_std_dev: 0,
            kv_cache_transfer_latency: 1000,
            kv_cache_transfer_latency_std_dev: 0,
            ..Config::default()
        });
        assert_eq!(m.time_to_first_token(false), Duration::from_millis(10_000));
        assert_eq!(m.time_to_first_token(true), Duration::from_millis(1000));
    }

    #[test]
    fn time_to_first_token_respects_clip_band() {
        let m = LatencyModel::new(&Config {
            time_to_first_token: 10_000,
            time_to_first_token_std_dev: 9000,
            kv_cache_transfer_latency: 1000,
            kv_cache_transfer_latency_std_dev: 800,
            ..Config::default()
        });
        for _ in 0..200 {
            let local = m.time_to_first_token(false).as_secs_f64() * 1000.0;
            assert!((3000.0..=17_000.0).contains(&local));
            let remote = m.time_to_first_token(true).as_secs_f64() * 1000.0;
            assert!((300.0..=1700.0).contains(&remote));
        }
    }
}
