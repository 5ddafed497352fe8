//! Runtime configuration for a [`crate::protocol::ProtocolEngine`].

use crate::protocol::frame::MAX_FRAME;

/// Buffer sizing knobs for a [`crate::protocol::ProtocolEngine`].
///
/// These only affect performance (initial allocation size, the ceiling on how
/// large a single frame is allowed to grow); they never change wire
/// semantics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EngineConfig {
    /// The initial capacity, in bytes, of the engine's read and write
    /// buffers. Buffers grow past this on demand, up to `max_frame_size`.
    pub initial_buf_capacity: usize,
    /// The largest frame, in bytes, the engine will admit before returning
    /// [`crate::protocol::ProtocolError::Oversize`].
    pub max_frame_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_buf_capacity: 4096,
            max_frame_size: MAX_FRAME,
        }
    }
}

impl EngineConfig {
    /// Builds a config from `MYSQLX_INITIAL_BUF_CAPACITY`/`MYSQLX_MAX_FRAME_SIZE`,
    /// falling back to [`Default::default`] for any variable that is unset or
    /// fails to parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let initial_buf_capacity = std::env::var("MYSQLX_INITIAL_BUF_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.initial_buf_capacity);

        let max_frame_size = std::env::var("MYSQLX_MAX_FRAME_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_frame_size)
            .min(MAX_FRAME);

        EngineConfig { initial_buf_capacity, max_frame_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.initial_buf_capacity, 4096);
        assert_eq!(cfg.max_frame_size, MAX_FRAME);
    }

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        std::env::remove_var("MYSQLX_INITIAL_BUF_CAPACITY");
        std::env::remove_var("MYSQLX_MAX_FRAME_SIZE");
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    }

    #[test]
    fn from_env_reads_and_clamps_max_frame_size() {
        std::env::set_var("MYSQLX_INITIAL_BUF_CAPACITY", "8192");
        std::env::set_var("MYSQLX_MAX_FRAME_SIZE", "999999999999");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.initial_buf_capacity, 8192);
        assert_eq!(cfg.max_frame_size, MAX_FRAME);
        std::env::remove_var("MYSQLX_INITIAL_BUF_CAPACITY");
        std::env::remove_var("MYSQLX_MAX_FRAME_SIZE");
    }
}
