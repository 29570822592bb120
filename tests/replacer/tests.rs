use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use sboxdb_replacer::config::Config;
use sboxdb_replacer::error::Result;
use sboxdb_replacer::storage::heap::replacer::{Replacer, SyncLRUKReplacer};
use sboxdb_replacer::storage::heap::FrameId;

use super::model::Model;

#[test]
fn test_random_ops_against_model() -> Result<()> {
    let cases = vec![(1, 1), (4, 1), (8, 2), (16, 3), (32, 4)];
    for (num_frames, k) in cases {
        setup!(replacer, num_frames, k);
        info!("random ops with {} frames, k = {}", num_frames, k);

        let mut model = Model::new(num_frames, k);
        let mut rng = StdRng::seed_from_u64((num_frames * 31 + k) as u64);
        for _ in 0..5000 {
            let frame_id: FrameId = rng.gen_range(0..num_frames);
            match rng.gen_range(0..10) {
                0..=3 => {
                    replacer.record_access(frame_id);
                    model.record_access(frame_id);
                }
                4..=6 => {
                    let evictable = rng.gen_bool(0.5);
                    replacer.set_evictable(frame_id, evictable);
                    model.set_evictable(frame_id, evictable);
                }
                7 => {
                    if model.evictable[frame_id] {
                        replacer.remove(frame_id);
                        model.remove(frame_id);
                    }
                }
                _ => {
                    let victim = replacer.evict();
                    assert_eq!(model.evict(), victim);
                }
            }
            assert_eq!(model.size(), replacer.size());
            assert_eq!(model.evictable[frame_id], replacer.is_evictable(frame_id));
        }
    }
    Ok(())
}

/// Drive the replacer the way a buffer pool does: a frame is evictable once its
/// pin count drops to zero.
#[test]
fn test_pin_count_driver() -> Result<()> {
    let num_frames = 10;
    setup!(replacer, num_frames, 2);

    let mut pin_counts = vec![0usize; num_frames];
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..2000 {
        let frame_id: FrameId = rng.gen_range(0..num_frames);
        if rng.gen_bool(0.6) {
            replacer.record_access(frame_id);
            pin_counts[frame_id] += 1;
            if pin_counts[frame_id] == 1 {
                replacer.set_evictable(frame_id, false);
            }
        } else if pin_counts[frame_id] > 0 {
            pin_counts[frame_id] -= 1;
            if pin_counts[frame_id] == 0 {
                replacer.set_evictable(frame_id, true);
            }
        }
        let unpinned = pin_counts.iter().filter(|&&c| c == 0).count();
        let evictable = (0..num_frames).filter(|&f| replacer.is_evictable(f)).count();
        assert_eq!(evictable, replacer.size());
        assert!(replacer.size() <= unpinned);
    }

    // victims are never pinned, and each one is handed out once.
    let mut victims = HashSet::new();
    while let Some(frame_id) = replacer.evict() {
        debug!("victim {}", frame_id);
        assert_eq!(0, pin_counts[frame_id]);
        assert!(victims.insert(frame_id));
    }
    assert_eq!(0, replacer.size());
    Ok(())
}

#[test]
fn test_concurrent_access() -> Result<()> {
    let num_threads = 4;
    let frames_per_thread = 8;
    setup!(replacer, num_threads * frames_per_thread, 3);

    let mut handles = vec![];
    for t in 0..num_threads {
        let replacer = Arc::clone(&replacer);
        handles.push(thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(t as u64);
            let first = t * frames_per_thread;
            for _ in 0..1000 {
                let frame_id = first + rng.gen_range(0..frames_per_thread);
                replacer.record_access(frame_id);
                replacer.set_evictable(frame_id, rng.gen_bool(0.5));
            }
            for frame_id in first..first + frames_per_thread {
                replacer.set_evictable(frame_id, true);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("replacer thread panicked");
    }

    assert_eq!(num_threads * frames_per_thread, replacer.size());
    let mut victims = HashSet::new();
    while let Some(frame_id) = replacer.evict() {
        assert!(victims.insert(frame_id));
    }
    assert_eq!(num_threads * frames_per_thread, victims.len());
    assert_eq!(0, replacer.size());
    Ok(())
}

#[test]
fn test_replacer_from_config() -> Result<()> {
    let cfg = Config::new("")?;
    let replacer: Arc<dyn Replacer> = Arc::new(SyncLRUKReplacer::from_config(&cfg));
    for frame_id in 0..cfg.pool_size {
        replacer.set_evictable(frame_id, true);
    }
    assert_eq!(cfg.pool_size, replacer.size());
    Ok(())
}
