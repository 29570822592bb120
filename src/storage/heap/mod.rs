pub mod history;
pub mod replacer;

/// Index of a page frame in the buffer pool, i.e., in range: [0, pool_size).
pub type FrameId = usize;

/// Logical access timestamp. Only used for ordering, never for wall-clock time.
pub type Timestamp = u64;
