//! Outbound request identity rotation
//!
//! Each fetch attempt presents a browser identity drawn uniformly at random,
//! with replacement, from a fixed pool.

use crate::pacing::RandomSource;

/// Desktop browser identities used when no pool is configured
pub const DEFAULT_USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36 Edg/91.0.864.59",
];

/// Read-only pool of user-agent strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPool {
    agents: Vec<String>,
}

impl IdentityPool {
    /// Creates a pool from the given identities
    ///
    /// Callers are expected to pass a validated, non-empty pool. Blank entries
    /// are dropped anyway, and if nothing is left the pool falls back to
    /// `DEFAULT_USER_AGENTS` with a warning.
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pool = Self {
            agents: agents
                .into_iter()
                .map(Into::into)
                .filter(|agent: &String| !agent.trim().is_empty())
                .collect(),
        };

        if pool.is_empty() {
            tracing::warn!("No usable user agents given, using the built-in identities");
            return Self::default();
        }

        pool
    }

    /// Picks one identity for the next attempt
    pub fn rotate<R: RandomSource>(&self, random: &R) -> &str {
        let index = random.index(self.agents.len());
        self.agents
            .get(index)
            .or_else(|| self.agents.first())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
