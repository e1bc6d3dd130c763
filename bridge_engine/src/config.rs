//! Engine configuration

/// Default bound on nested synchronous calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// How a `return` is matched to the call waiting for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnCorrelation {
    /// The next `return` answers the innermost pending call
    #[default]
    Positional,
    /// Calls carry an `id` and the host echoes it in `{value, id}`
    Tagged,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Send debug messages from the start
    pub debug: bool,
    /// Fork before entering the read loop
    pub fork_first: bool,
    /// Maximum number of synchronous calls waiting at once
    pub max_call_depth: usize,
    /// Return matching strategy
    pub return_correlation: ReturnCorrelation,
    /// Text replaced with `"` in string arguments to commands and aliases
    pub quote_replacement: Option<String>,
}

impl EngineConfig {
    /// Creates the default configuration
    pub fn new() -> Self {
        Self {
            debug: false,
            fork_first: true,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            return_correlation: ReturnCorrelation::Positional,
            quote_replacement: None,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_fork_first(mut self, fork_first: bool) -> Self {
        self.fork_first = fork_first;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_return_correlation(mut self, correlation: ReturnCorrelation) -> Self {
        self.return_correlation = correlation;
        self
    }

    pub fn with_quote_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.quote_replacement = Some(replacement.into());
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
