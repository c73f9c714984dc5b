//! Configuration options for a SparseDb row store.

/// Configuration options for a [`RowStore`](crate::RowStore).
#[derive(Debug, Clone)]
pub struct Options {
    /// Initial capacity of the key-building buffer allocated per operation (in bytes).
    /// Default: 128
    pub key_capacity: usize,

    /// How `WriteTimestamp::Auto` is turned into an actual timestamp.
    /// Default: AutoTimestamp::Monotonic
    pub auto_timestamp: AutoTimestamp,

    /// Check that every encoded batch is strictly ascending before it is
    /// submitted to the index.
    /// Default: true
    pub verify_batch_order: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            key_capacity: 128,
            auto_timestamp: AutoTimestamp::default(),
            verify_batch_order: true,
        }
    }
}

/// Timestamp sources for automatically timestamped writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoTimestamp {
    /// A process-wide clock in milliseconds that never repeats and never goes
    /// backwards, even when the wall clock does.
    #[default]
    Monotonic,

    /// The current wall-clock time in milliseconds. Two writes to the same
    /// column within one millisecond share a timestamp and the later one
    /// replaces the earlier.
    WallClock,
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial capacity of the key-building buffer.
    pub fn key_capacity(mut self, capacity: usize) -> Self {
        self.key_capacity = capacity;
        self
    }

    /// Sets the timestamp source for automatically timestamped writes.
    pub fn auto_timestamp(mut self, source: AutoTimestamp) -> Self {
        self.auto_timestamp = source;
        self
    }

    /// Enables or disables the batch ordering check.
    pub fn verify_batch_order(mut self, value: bool) -> Self {
        self.verify_batch_order = value;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.key_capacity == 0 {
            return Err(crate::Error::invalid_argument("key_capacity must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.key_capacity, 128);
        assert_eq!(opts.auto_timestamp, AutoTimestamp::Monotonic);
        assert!(opts.verify_batch_order);
    }

    #[test]
    fn test_options_builder() {
        let opts = Options::new()
            .key_capacity(512)
            .auto_timestamp(AutoTimestamp::WallClock)
            .verify_batch_order(false);

        assert_eq!(opts.key_capacity, 512);
        assert_eq!(opts.auto_timestamp, AutoTimestamp::WallClock);
        assert!(!opts.verify_batch_order);
    }

    #[test]
    fn test_options_validation() {
        let mut opts = Options::default();
        assert!(opts.validate().is_ok());

        opts.key_capacity = 0;
        assert!(opts.validate().is_err());
    }
}
