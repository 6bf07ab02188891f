//! Background region preparation.
//!
//! Workers validate records and build collision shapes; the owning thread
//! drains finished regions and links them into its [`Space`]. A region's
//! name sits in the world's pending set from request until it is absorbed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use vista_world::{CollisionAssets, PendingMappings, PreparedRegion, RegionId, RegionRecordError};

use crate::{LightRecord, RegionEntry, Space};

pub struct LoadOut {
    pub name: String,
    pub result: Result<PreparedRegion, RegionRecordError>,
    pub lights: Vec<LightRecord>,
}

pub struct RegionLoader {
    job_tx: Sender<RegionEntry>,
    res_rx: Receiver<LoadOut>,
    pending: PendingMappings,
    in_flight: Arc<AtomicUsize>,
    workers: usize,
}

impl RegionLoader {
    /// Spawns `workers` threads (at least one). They exit once the loader is
    /// dropped.
    pub fn new(assets: Arc<CollisionAssets>, pending: PendingMappings, workers: usize) -> Self {
        let (job_tx, job_rx) = unbounded::<RegionEntry>();
        let (res_tx, res_rx) = unbounded::<LoadOut>();
        let workers = workers.max(1);
        for i in 0..workers {
            let job_rx = job_rx.clone();
            let res_tx = res_tx.clone();
            let assets = Arc::clone(&assets);
            thread::spawn(move || {
                while let Ok(entry) = job_rx.recv() {
                    let result = entry.record.prepare(&assets);
                    if let Err(e) = &result {
                        log::debug!(target: "loader", "worker {} rejected {}: {}", i, entry.record.name, e);
                    }
                    let out = LoadOut {
                        name: entry.record.name,
                        result,
                        lights: entry.lights,
                    };
                    if res_tx.send(out).is_err() {
                        break;
                    }
                }
            });
        }
        Self {
            job_tx,
            res_rx,
            pending,
            in_flight: Arc::new(AtomicUsize::new(0)),
            workers,
        }
    }

    /// A loader sharing the space's assets and pending set.
    pub fn for_space(space: &Space, workers: usize) -> Self {
        Self::new(Arc::clone(space.assets()), space.world().pending().clone(), workers)
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Requests not yet drained, finished or not.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Queues a region. Returns false if one with that name is already
    /// pending.
    pub fn request(&self, entry: RegionEntry) -> bool {
        if !self.pending.insert(&entry.record.name) {
            log::trace!(target: "loader", "{} already pending", entry.record.name);
            return false;
        }
        let name = entry.record.name.clone();
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if self.job_tx.send(entry).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            self.pending.remove(&name);
            return false;
        }
        true
    }

    /// Finished regions, without blocking.
    pub fn drain(&self) -> Vec<LoadOut> {
        let out: Vec<LoadOut> = self.res_rx.try_iter().collect();
        self.in_flight.fetch_sub(out.len(), Ordering::AcqRel);
        out
    }

    /// Blocks for the next finished region; `None` when nothing is in
    /// flight.
    pub fn wait(&self) -> Option<LoadOut> {
        if self.in_flight() == 0 {
            return None;
        }
        let out = self.res_rx.recv().ok()?;
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        Some(out)
    }

    /// Loads and binds everything finished so far into `space`.
    pub fn drain_into(&self, space: &mut Space) -> Vec<Result<RegionId, RegionRecordError>> {
        let results: Vec<_> = self.drain().into_iter().map(|out| absorb(space, out)).collect();
        if !results.is_empty() {
            space.refresh_lighting();
        }
        results
    }

    /// Blocks until every request has been absorbed into `space`.
    pub fn finish_into(&self, space: &mut Space) -> Vec<Result<RegionId, RegionRecordError>> {
        let mut results = Vec::new();
        while let Some(out) = self.wait() {
            results.push(absorb(space, out));
        }
        space.refresh_lighting();
        results
    }
}

/// Hands one finished region to the space. A rejected record leaves the
/// pending set so it can be requested again.
pub fn absorb(space: &mut Space, out: LoadOut) -> Result<RegionId, RegionRecordError> {
    let prepared = match out.result {
        Ok(p) => p,
        Err(e) => {
            space.world().pending().remove(&out.name);
            log::warn!(target: "loader", "region {} not loaded: {}", out.name, e);
            return Err(e);
        }
    };
    let id = match space.insert_region(prepared, &out.lights) {
        Ok(id) => id,
        Err(e) => {
            space.world().pending().remove(&out.name);
            log::warn!(target: "loader", "region {} not loaded: {}", out.name, e);
            return Err(e);
        }
    };
    space.bind(id);
    log::debug!(target: "loader", "region {} absorbed as {}", out.name, id);
    Ok(id)
}
