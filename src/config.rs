//! Connection configuration, mirroring the teacher's
//! `MySqlConnectOptions` fluent-setter style but without a URL parser: the
//! enumerated fields here are everything the core needs, not a
//! connection-string grammar.

use crate::processor::MetaMode;
use crate::state::DEFAULT_COLLATION_ID;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    Enable,
    Require,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub ssl_mode: SslMode,
    pub initial_buffer_size: usize,
    pub max_buffer_size: usize,
    pub connection_collation: u16,
    pub multi_queries: bool,
    pub meta_mode: MetaMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ssl_mode: SslMode::Enable,
            initial_buffer_size: 4 * 1024,
            max_buffer_size: 1024 * 1024 * 1024,
            connection_collation: DEFAULT_COLLATION_ID,
            multi_queries: false,
            meta_mode: MetaMode::Full,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn with_ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = mode;
        self
    }

    pub fn with_initial_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = size;
        self
    }

    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    pub fn with_connection_collation(mut self, collation_id: u16) -> Self {
        self.connection_collation = collation_id;
        self
    }

    pub fn with_multi_queries(mut self, enabled: bool) -> Self {
        self.multi_queries = enabled;
        self
    }

    pub fn with_meta_mode(mut self, mode: MetaMode) -> Self {
        self.meta_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains_overrides() {
        let c = Config::new()
            .with_ssl_mode(SslMode::Require)
            .with_max_buffer_size(8192);
        assert_eq!(c.ssl_mode, SslMode::Require);
        assert_eq!(c.max_buffer_size, 8192);
    }
}
