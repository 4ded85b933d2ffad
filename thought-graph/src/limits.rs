//! Resource limiter: the four quantities every search strategy checks each
//! iteration (total thoughts, cumulative tokens, start wall time, expansion
//! count). `Graph::add_thought` enforces `max_thoughts` on its own; this
//! type is what strategies hold onto for the two budgets the core never
//! raises an error for — `max_tokens` and `timeout_seconds` are reported as
//! a `termination_reason`, never propagated as `GraphError::ResourceExhausted`.

use crate::search::SearchConfig;

pub struct ResourceLimiter {
    max_expansions: usize,
    max_tokens: Option<u64>,
    timeout_seconds: Option<f64>,
    expansions: usize,
    tokens_used: u64,
    started_at: std::time::Instant,
}

impl ResourceLimiter {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            max_expansions: config.max_expansions,
            max_tokens: config.max_tokens,
            timeout_seconds: config.timeout_seconds,
            expansions: 0,
            tokens_used: 0,
            started_at: std::time::Instant::now(),
        }
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn tokens_used(&self) -> u64 {
        self.tokens_used
    }

    pub fn timed_out(&self) -> bool {
        match self.timeout_seconds {
            Some(limit) => self.started_at.elapsed().as_secs_f64() >= limit,
            None => false,
        }
    }

    pub fn expansions_exhausted(&self) -> bool {
        self.expansions >= self.max_expansions
    }

    pub fn budget_exhausted(&self) -> bool {
        matches!(self.max_tokens, Some(limit) if self.tokens_used >= limit)
    }

    pub fn record_expansion(&mut self, tokens: u64) {
        self.expansions += 1;
        self.tokens_used += tokens;
    }

    pub fn wall_time_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
