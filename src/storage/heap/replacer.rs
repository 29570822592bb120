use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use super::history::{History, KDistance};
use super::FrameId;
use crate::config::Config;

///  Replacer tracks page usage for replacement in case of buffer pool is full.
///
/// Frame ids out of range [0, capacity) are a programming error of the caller
/// and make every method panic.
pub trait Replacer: Send + Sync {
    /// Record the event that the given frame id is accessed at current timestamp.
    /// The evictable flag of the frame is left as it is, pinning is up to the
    /// caller through `set_evictable`.
    fn record_access(&self, frame_id: FrameId);

    /// Find the frame to evict with replace policy(e.g. backward k-distance). Only frames that
    /// are marked as evictable are candidates for eviction.
    ///
    /// Successful eviction of a frame should decrement the size of replacer, mark the frame
    /// non-evictable and remove the frame's access history.
    ///
    /// Return the frame id if a frame is evicted successfully, None if no frames can be evicted.
    fn evict(&self) -> Option<FrameId>;

    /// Toggle whether a frame is evictable or non-evictable. this function also control replacer
    /// size. Note that size is equal to number of evictable entries.
    ///
    /// If a frame was previously evictable and is to be set to non-evictable, then size should
    /// decrement. If a frame was previously non-evictable and is to be set evictable, then size
    /// should increment.
    fn set_evictable(&self, frame_id: FrameId, evictable: bool);

    /// Check if a frame is evictable.
    fn is_evictable(&self, frame_id: FrameId) -> bool;

    /// Clear the access history of an evictable frame, the frame stays evictable and is
    /// treated as never accessed afterwards.
    ///
    /// Note that this is different from evicting a frame, which picks the frame by the
    /// replace policy.
    ///
    /// Panics if the frame is non-evictable, i.e., still pinned by the buffer pool.
    fn remove(&self, frame_id: FrameId);

    /// Number of evictable frames.
    fn size(&self) -> usize;
}

/// LRUKReplacer implements the LRU-k replacement policy.
///
/// The LRU-k algorithm evicts a frame whose backward k-distance is maximum of
/// all frames. Backward k-distance is computed as the difference in time between
/// the current timestamp and the timestamp of k-th previous access.
///
/// A frame with less than k history references is given +inf as its backward k-distance.
/// when multiple frames have +inf backward k-distance, classical LRU algorithm is used
/// to choose victim.
pub struct LRUKReplacer {
    history: History,
    /// evictable flag of every frame, indexed by frame id.
    evictable: Vec<bool>,
    /// number of frames whose evictable flag is set.
    current_size: usize,
}

impl LRUKReplacer {
    pub fn new(num_frames: usize, k: usize) -> Self {
        let history = History::new(num_frames, k);
        debug!("create lru-k replacer with {} frames, k = {}", num_frames, k);
        LRUKReplacer { history, evictable: vec![false; num_frames], current_size: 0 }
    }

    pub fn k(&self) -> usize {
        self.history.k()
    }

    /// Number of frames the replacer tracks.
    pub fn capacity(&self) -> usize {
        self.evictable.len()
    }

    pub fn record_access(&mut self, frame_id: FrameId) {
        self.check_frame(frame_id);
        self.history.record_access(frame_id);
        trace!("frame {} accessed at {}", frame_id, self.history.current_timestamp());
    }

    /// Find the frame with the largest backward k-distance and evict that frame. Only frames
    /// that are marked as evictable are candidates for eviction.
    ///
    /// A Frame with less than k historical reference is given +inf as its backward k-distance.
    /// If multiple frames have inf backward k-distance, then evict the frame with the earliest
    /// timestamp overall, a frame never accessed counts as the earliest.
    ///
    /// Every frame is visited once, among candidates of the same priority the one with the
    /// smallest frame id wins.
    pub fn evict(&mut self) -> Option<FrameId> {
        if self.current_size == 0 {
            return None;
        }

        let mut victim: Option<(FrameId, KDistance)> = None;
        for (frame_id, &is_evictable) in self.evictable.iter().enumerate() {
            if !is_evictable {
                continue;
            }
            let dist = self.history.backward_k_distance(frame_id);
            match victim {
                Some((_, best)) if best <= dist => {}
                _ => victim = Some((frame_id, dist)),
            }
        }

        // current_size is larger than zero, so there is at least one evictable frame.
        let (frame_id, dist) = victim?;
        debug!(
            "evict frame {}, backward k-distance {:?}",
            frame_id,
            dist.distance(self.history.current_timestamp())
        );
        self.evictable[frame_id] = false;
        self.current_size -= 1;
        self.history.remove(frame_id);

        Some(frame_id)
    }

    /// Toggle whether a frame is evictable or non-evictable. this function also control replacer
    /// size. Note that size is equal to number of evictable entries.
    ///
    /// For other scenarios, this function should terminate without modifying anything.
    pub fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        self.check_frame(frame_id);
        let is_evictable = self.evictable[frame_id];
        if is_evictable == evictable {
            return;
        }

        self.evictable[frame_id] = evictable;
        if evictable {
            self.current_size += 1;
        } else {
            self.current_size -= 1;
        }
    }

    pub fn is_evictable(&self, frame_id: FrameId) -> bool {
        self.check_frame(frame_id);
        self.evictable[frame_id]
    }

    /// Drop the access history of an evictable frame, no matter what its backward k-distance
    /// is. The frame stays evictable so the size is left untouched.
    pub fn remove(&mut self, frame_id: FrameId) {
        self.check_frame(frame_id);
        assert!(self.evictable[frame_id], "remove non-evictable frame {}", frame_id);
        self.history.remove(frame_id);
        debug!("remove access history of frame {}", frame_id);
    }

    pub fn size(&self) -> usize {
        self.current_size
    }

    fn check_frame(&self, frame_id: FrameId) {
        assert!(
            frame_id < self.evictable.len(),
            "frame id {} out of range [0, {})",
            frame_id,
            self.evictable.len()
        );
    }
}

/// SyncLRUKReplacer implements the thread-safe version of LRU-k replacement policy,
/// basically all the heavy lifting are happens in the LRUKReplacer.
pub struct SyncLRUKReplacer {
    inner: Mutex<LRUKReplacer>,
}

impl SyncLRUKReplacer {
    pub fn new(num_frames: usize, k: usize) -> Self {
        let inner = Mutex::new(LRUKReplacer::new(num_frames, k));
        SyncLRUKReplacer { inner }
    }

    /// Create a replacer sized by `pool_size` with `replacer_k` of the config.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.pool_size, cfg.replacer_k)
    }

    /// Contract violations panic before any state is touched, so a lock poisoned
    /// by one of them still guards a consistent replacer.
    fn lock(&self) -> MutexGuard<'_, LRUKReplacer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Replacer for SyncLRUKReplacer {
    fn record_access(&self, frame_id: FrameId) {
        self.lock().record_access(frame_id)
    }

    fn evict(&self) -> Option<FrameId> {
        self.lock().evict()
    }

    fn set_evictable(&self, frame_id: FrameId, evictable: bool) {
        self.lock().set_evictable(frame_id, evictable)
    }

    fn is_evictable(&self, frame_id: FrameId) -> bool {
        self.lock().is_evictable(frame_id)
    }

    fn remove(&self, frame_id: FrameId) {
        self.lock().remove(frame_id)
    }

    fn size(&self) -> usize {
        self.lock().size()
    }
}
