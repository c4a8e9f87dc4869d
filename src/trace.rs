//! Fixed-capacity ring of timing events, compatible field-for-field with
//! chrome-trace JSON (`name`, `cat`, `ph`, `ts`, `pid`, `tid`).
//!
//! Guarded by its own lock rather than piggybacking on the scheduler's state mutex
//! (§9 of SPEC_FULL.md) — trace appends have no ordering dependency on track-state
//! transitions, so giving them a separate lock removes one axis of contention
//! between workers without changing any observable behavior.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceEventType {
    RenderSamples,
    RenderTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[serde(rename = "B")]
    Begin,
    #[serde(rename = "E")]
    End,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    #[serde(rename = "type")]
    pub event_type: TraceEventType,
    pub name: String,
    #[serde(rename = "cat")]
    pub category: &'static str,
    #[serde(rename = "ph")]
    pub phase: Phase,
    pub ts: i64,
    pub pid: u32,
    pub tid: u64,
    pub render_samples_call_index: i32,
    pub track_index: i32,
}

pub struct TraceRing {
    capacity: usize,
    events: Mutex<Vec<TraceEvent>>,
    overflowed: AtomicBool,
}

impl TraceRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(Vec::with_capacity(capacity)),
            overflowed: AtomicBool::new(false),
        }
    }

    pub fn push_render_samples(&self, phase: Phase, call_index: i32, ts_us: i64, pid: u32, tid: u64) {
        self.push(TraceEvent {
            event_type: TraceEventType::RenderSamples,
            name: "Render".to_string(),
            category: "Tracks",
            phase,
            ts: ts_us,
            pid,
            tid,
            render_samples_call_index: call_index,
            track_index: 0,
        });
    }

    pub fn push_render_track(&self, phase: Phase, track_index: usize, ts_us: i64, pid: u32, tid: u64) {
        self.push(TraceEvent {
            event_type: TraceEventType::RenderTrack,
            name: "Render".to_string(),
            category: "Tracks",
            phase,
            ts: ts_us,
            pid,
            tid,
            render_samples_call_index: 0,
            track_index: track_index as i32,
        });
    }

    fn push(&self, event: TraceEvent) {
        let mut events = self.events.lock().unwrap();
        if events.len() < self.capacity {
            events.push(event);
        } else if !self.overflowed.swap(true, Ordering::Relaxed) {
            tracing::warn!(capacity = self.capacity, "trace ring saturated; dropping further events");
        }
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }
}

/// Microseconds elapsed since `start`, for trace timestamps.
pub fn elapsed_us(start: Instant) -> i64 {
    start.elapsed().as_micros() as i64
}

pub fn current_pid() -> u32 {
    std::process::id()
}

pub fn current_tid() -> u64 {
    // std::thread::ThreadId doesn't expose a stable numeric value; libc's gettid
    // gives a real OS thread id on the platforms this crate targets, matching
    // what the original host's GetCurrentThreadId() captured.
    #[cfg(target_os = "linux")]
    {
        unsafe { libc::syscall(libc::SYS_gettid) as u64 }
    }
    #[cfg(not(target_os = "linux"))]
    {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        hasher.finish()
    }
}
