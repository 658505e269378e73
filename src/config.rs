/// Thread name prefix used when none is configured.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "pool-worker";

/// Construction parameters for a [`WorkerPool`](crate::WorkerPool).
///
/// ```
/// use workpool::PoolConfig;
///
/// let config = PoolConfig::new(8)
///     .with_thread_name_prefix("io")
///     .with_queue_capacity(1024);
/// assert_eq!(config.threads(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    threads: usize,
    thread_name_prefix: String,
    queue_capacity: Option<usize>,
    stack_size: Option<usize>,
}

impl PoolConfig {
    /// Creates a config for `threads` workers with an unbounded queue.
    pub fn new(threads: usize) -> Self {
        PoolConfig {
            threads,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_owned(),
            queue_capacity: None,
            stack_size: None,
        }
    }

    /// Sets the prefix of worker thread names. Workers are named `<prefix>-<id>`.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Bounds the task queue to `capacity` waiting tasks.
    ///
    /// A capacity of zero makes every submission wait for a worker to take it.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Sets the stack size of each worker thread, in bytes.
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Prefix of worker thread names.
    pub fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }

    /// Queue bound, or `None` for an unbounded queue.
    pub fn queue_capacity(&self) -> Option<usize> {
        self.queue_capacity
    }

    /// Worker stack size, or `None` for the platform default.
    pub fn stack_size(&self) -> Option<usize> {
        self.stack_size
    }
}

impl Default for PoolConfig {
    /// One worker per logical CPU.
    fn default() -> Self {
        PoolConfig::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = PoolConfig::new(3);
        assert_eq!(config.threads(), 3);
        assert_eq!(config.thread_name_prefix(), DEFAULT_THREAD_NAME_PREFIX);
        assert_eq!(config.queue_capacity(), None);
        assert_eq!(config.stack_size(), None);
    }

    #[test]
    fn builder_overrides() {
        let config = PoolConfig::new(2)
            .with_thread_name_prefix("render")
            .with_queue_capacity(16)
            .with_stack_size(256 * 1024);
        assert_eq!(config.thread_name_prefix(), "render");
        assert_eq!(config.queue_capacity(), Some(16));
        assert_eq!(config.stack_size(), Some(256 * 1024));
    }

    #[test]
    fn default_matches_cpu_count() {
        assert_eq!(PoolConfig::default().threads(), num_cpus::get());
    }
}
