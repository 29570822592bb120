use std::cmp::Ordering;
use std::collections::VecDeque;

use super::{FrameId, Timestamp};

/// Backward k-distance of a frame, expressed as the key used to compare
/// eviction candidates.
///
/// A frame with a full window of k accesses has a finite distance, which is
/// `now - reference`. A frame with less than k accesses has +inf distance, the
/// reference is then the earliest timestamp it has recorded, or 0 if it has
/// never been accessed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct KDistance {
    pub has_full_window: bool,
    pub reference: Timestamp,
}

impl KDistance {
    /// The backward k-distance at `now`, None stands for +inf.
    pub fn distance(&self, now: Timestamp) -> Option<Timestamp> {
        if !self.has_full_window {
            return None;
        }
        Some(now - self.reference)
    }
}

impl PartialOrd for KDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The better victim sorts first: +inf distance before any finite one, and
/// within the same class the smaller reference timestamp, which is the larger
/// distance for a full window and the classical LRU order otherwise.
impl Ord for KDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.has_full_window.cmp(&other.has_full_window) {
            Ordering::Equal => self.reference.cmp(&other.reference),
            other => other,
        }
    }
}

/// History keeps the last k access timestamps of every frame in the buffer pool.
///
/// The per frame histories are allocated up front for the whole frame universe
/// and indexed by frame id. Timestamps are issued from one counter shared by all
/// frames, the first one issued is 1 so that 0 can stand for "never accessed".
pub struct History {
    k: usize,
    current_timestamp: Timestamp,
    /// Least recent timestamp stored in front.
    frames: Vec<VecDeque<Timestamp>>,
}

impl History {
    pub fn new(num_frames: usize, k: usize) -> Self {
        assert!(k > 0, "replacer k should be larger than zero");
        let frames = (0..num_frames).map(|_| VecDeque::with_capacity(k)).collect();
        History { k, current_timestamp: 0, frames }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// The last issued timestamp, 0 if no access has been recorded yet.
    pub fn current_timestamp(&self) -> Timestamp {
        self.current_timestamp
    }

    /// Number of accesses kept for the frame, at most k.
    pub fn len(&self, frame_id: FrameId) -> usize {
        self.check_frame(frame_id);
        self.frames[frame_id].len()
    }

    /// Record an access of the frame with a freshly issued timestamp, the oldest
    /// one is dropped if the frame already holds k of them.
    pub fn record_access(&mut self, frame_id: FrameId) {
        self.check_frame(frame_id);
        self.current_timestamp += 1;
        let history = &mut self.frames[frame_id];
        if history.len() == self.k {
            history.pop_front();
        }
        history.push_back(self.current_timestamp);
    }

    pub fn backward_k_distance(&self, frame_id: FrameId) -> KDistance {
        self.check_frame(frame_id);
        let history = &self.frames[frame_id];
        let reference = history.front().copied().unwrap_or(0);
        KDistance { has_full_window: history.len() == self.k, reference }
    }

    /// Forget everything about the frame, it is "never accessed" afterwards.
    pub fn remove(&mut self, frame_id: FrameId) {
        self.check_frame(frame_id);
        self.frames[frame_id].clear();
    }

    fn check_frame(&self, frame_id: FrameId) {
        assert!(
            frame_id < self.frames.len(),
            "frame id {} out of range [0, {})",
            frame_id,
            self.frames.len()
        );
    }
}
