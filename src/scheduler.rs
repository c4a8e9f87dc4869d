//! The three-state scheduler: a mutex-guarded `state[]` vector, workers that scan
//! it from index zero for the first `Idle` track whose receives are all
//! `Finished`, and a façade that resets `state[]` to `Idle` and spins for the
//! master track to reach `Finished`. See SPEC_FULL.md §4.2/§9 — this is a state
//! machine the DAG is never walked to build, not a work-stealing queue.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::denormal::DenormalGuard;
use crate::trace::{current_pid, current_tid, elapsed_us, Phase, TraceRing};
use crate::track::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Rendering,
    Finished,
}

struct SchedulerState {
    track_states: Vec<RenderState>,
    num_float_samples: usize,
    shutdown: bool,
}

pub struct Scheduler {
    state: Arc<Mutex<SchedulerState>>,
    tracks: Arc<Vec<Track>>,
    trace: Arc<TraceRing>,
    start: Instant,
    workers: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(tracks: Arc<Vec<Track>>, num_worker_threads: usize, trace: Arc<TraceRing>, start: Instant) -> Self {
        let num_tracks = tracks.len();
        let state = Arc::new(Mutex::new(SchedulerState {
            track_states: vec![RenderState::Finished; num_tracks],
            num_float_samples: 0,
            shutdown: false,
        }));

        let mut workers = Vec::with_capacity(num_worker_threads);
        let core_ids = core_affinity::get_core_ids().unwrap_or_default();
        for id in 0..num_worker_threads {
            let state = Arc::clone(&state);
            let tracks = Arc::clone(&tracks);
            let trace = Arc::clone(&trace);
            let core_id = core_ids.get(id).copied();
            let handle = thread::Builder::new()
                .name(format!("songrender-worker-{id}"))
                .spawn(move || {
                    if let Some(core_id) = core_id {
                        if !core_affinity::set_for_current(core_id) {
                            tracing::warn!(worker = id, "failed to pin worker thread to a CPU core");
                        }
                    }
                    boost_thread_priority(id);
                    worker_loop(state, tracks, trace, start, num_tracks);
                })
                .expect("failed to spawn songrender worker thread");
            workers.push(handle);
        }

        Self {
            state,
            tracks,
            trace,
            start,
            workers,
        }
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &Arc<Vec<Track>> {
        &self.tracks
    }

    /// Resets every track to `Idle` and sets the block size, under the lock.
    pub fn begin_block(&self, num_float_samples: usize) {
        let mut state = self.state.lock().unwrap();
        for s in state.track_states.iter_mut() {
            *s = RenderState::Idle;
        }
        state.num_float_samples = num_float_samples;
    }

    /// Spin-waits, re-acquiring the lock on every poll, until the master track
    /// (the last one) is `Finished`. Resolves the §9 open question about this
    /// read's memory-model soundness by making it a synchronized read.
    pub fn wait_for_master(&self) {
        let master = self.tracks.len() - 1;
        loop {
            if self.state.lock().unwrap().track_states[master] == RenderState::Finished {
                return;
            }
            thread::yield_now();
        }
    }

    pub fn shutdown(&mut self) {
        self.state.lock().unwrap().shutdown = true;
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.shutdown();
        }
    }
}

fn worker_loop(
    state: Arc<Mutex<SchedulerState>>,
    tracks: Arc<Vec<Track>>,
    trace: Arc<TraceRing>,
    start: Instant,
    num_tracks: usize,
) {
    let _denormal_guard = DenormalGuard::install();
    let pid = current_pid();
    let tid = current_tid();

    // `None` means "no previous claim" — an explicit sentinel rather than an
    // initial value equal to `num_tracks` (§9's resolved open question).
    let mut claimed: Option<usize> = None;

    loop {
        let mut guard = state.lock().unwrap();

        if guard.shutdown {
            return;
        }

        if let Some(prev) = claimed.take() {
            trace.push_render_track(Phase::End, prev, elapsed_us(start), pid, tid);
            guard.track_states[prev] = RenderState::Finished;
        }

        let mut next = None;
        for i in 0..num_tracks {
            if guard.track_states[i] == RenderState::Idle
                && tracks[i]
                    .receives
                    .iter()
                    .all(|r| guard.track_states[r.sending_track_index] == RenderState::Finished)
            {
                next = Some(i);
                break;
            }
        }

        let num_float_samples = guard.num_float_samples;

        if let Some(i) = next {
            guard.track_states[i] = RenderState::Rendering;
            trace.push_render_track(Phase::Begin, i, elapsed_us(start), pid, tid);
            claimed = Some(i);
        }

        drop(guard);

        match claimed {
            Some(i) => tracks[i].run(num_float_samples, &tracks),
            None => thread::yield_now(),
        }
    }
}

/// Best-effort priority boost; a failure here is logged, never fatal (§5: "highest
/// platform priority available").
fn boost_thread_priority(worker_id: usize) {
    #[cfg(unix)]
    {
        let ok = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, -20) } == 0;
        if !ok {
            tracing::warn!(worker = worker_id, "failed to raise worker thread priority");
        }
    }
    #[cfg(not(unix))]
    {
        let _ = worker_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ConstantDevice;
    use crate::track::Receive;

    fn single_track() -> Arc<Vec<Track>> {
        Arc::new(vec![Track::new(
            0,
            vec![],
            vec![Box::new(ConstantDevice::new(0.25, 0.25))],
            vec![],
        )])
    }

    #[test]
    fn single_track_block_completes() {
        let tracks = single_track();
        let trace = Arc::new(TraceRing::new(64));
        let mut scheduler = Scheduler::new(tracks, 1, trace, Instant::now());
        scheduler.begin_block(4);
        scheduler.wait_for_master();
        assert_eq!(scheduler.tracks()[0].sample(0, 0), 0.25);
        scheduler.shutdown();
    }

    #[test]
    fn chain_dag_with_multiple_workers_completes() {
        let tracks = Arc::new(vec![
            Track::new(0, vec![], vec![Box::new(ConstantDevice::new(0.5, 0.5))], vec![]),
            Track::new(
                1,
                vec![Receive {
                    sending_track_index: 0,
                    gain: 1.0,
                }],
                vec![],
                vec![],
            ),
        ]);
        let trace = Arc::new(TraceRing::new(64));
        let mut scheduler = Scheduler::new(tracks, 4, trace, Instant::now());
        scheduler.begin_block(8);
        scheduler.wait_for_master();
        assert_eq!(scheduler.tracks()[1].sample(0, 0), 0.5);
        scheduler.shutdown();
    }

    #[test]
    fn shutdown_during_teardown_does_not_deadlock() {
        let tracks = single_track();
        let trace = Arc::new(TraceRing::new(16));
        let mut scheduler = Scheduler::new(tracks, 2, trace, Instant::now());
        scheduler.begin_block(4);
        scheduler.wait_for_master();
        scheduler.shutdown();
    }
}
