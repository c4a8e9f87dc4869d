//! The public façade: parses the song blob, owns the worker pool through a
//! [`crate::scheduler::Scheduler`], and exposes `render_samples` — the single
//! entry point a host drives once per block.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::blob::BlobReader;
use crate::denormal::DenormalGuard;
use crate::device::{Device, DeviceFactory};
use crate::midi::MidiLane;
use crate::scheduler::Scheduler;
use crate::trace::{current_pid, current_tid, elapsed_us, Phase, TraceEvent, TraceRing};
use crate::track::{Receive, Track};

const DEFAULT_TRACE_CAPACITY: usize = 65536;

pub struct Renderer {
    bpm: i32,
    sample_rate: i32,
    length_seconds: f64,
    scheduler: Scheduler,
    trace: Arc<TraceRing>,
    start: Instant,
    render_samples_calls: AtomicI32,
}

impl Renderer {
    /// Parses `song` per SPEC_FULL.md §3 and spawns `num_worker_threads` workers.
    /// Panics on a malformed blob or an unrecognized device id — see §7.
    pub fn new(song: &[u8], num_worker_threads: usize, device_factory: DeviceFactory) -> Self {
        let mut reader = BlobReader::new(song);

        let bpm = reader.read_i32();
        let sample_rate = reader.read_i32();
        let length_seconds = reader.read_f64();

        let num_devices = reader.read_i32() as usize;
        let mut devices: Vec<Option<Box<dyn Device>>> = Vec::with_capacity(num_devices);
        for _ in 0..num_devices {
            let device_id = reader.read_byte();
            let chunk_size = reader.read_i32() as usize;
            let chunk = reader.read_chunk(chunk_size);

            let mut device = device_factory(device_id);
            device.set_sample_rate(sample_rate as f32);
            device.set_tempo(bpm);
            device.set_chunk(chunk);
            devices.push(Some(device));
        }

        let num_midi_lanes = reader.read_i32() as usize;
        let midi_lanes: Vec<Arc<MidiLane>> = (0..num_midi_lanes)
            .map(|_| Arc::new(MidiLane::read_from(&mut reader)))
            .collect();

        let num_tracks = reader.read_i32() as usize;
        assert!(num_tracks >= 1, "song must have at least one track (the master)");

        let mut tracks = Vec::with_capacity(num_tracks);
        for index in 0..num_tracks {
            let num_receives = reader.read_i32() as usize;
            let mut receives = Vec::with_capacity(num_receives);
            for _ in 0..num_receives {
                let sending_track_index = reader.read_i32() as usize;
                let gain = reader.read_f32();
                assert!(
                    sending_track_index < index,
                    "track {index} receives from {sending_track_index}, violating the DAG invariant"
                );
                receives.push(Receive {
                    sending_track_index,
                    gain,
                });
            }

            let num_device_refs = reader.read_i32() as usize;
            let mut track_devices = Vec::with_capacity(num_device_refs);
            for _ in 0..num_device_refs {
                let device_index = reader.read_i32() as usize;
                let device = devices[device_index]
                    .take()
                    .expect("device referenced by more than one track");
                track_devices.push(device);
            }

            let num_midi_refs = reader.read_i32() as usize;
            let mut track_midi = Vec::with_capacity(num_midi_refs);
            for _ in 0..num_midi_refs {
                let midi_index = reader.read_i32() as usize;
                track_midi.push(Arc::clone(&midi_lanes[midi_index]));
            }

            tracks.push(Track::new(index, receives, track_devices, track_midi));
        }

        tracing::info!(
            num_devices,
            num_midi_lanes,
            num_tracks,
            num_worker_threads,
            "constructed renderer"
        );

        let tracks = Arc::new(tracks);
        let trace = Arc::new(TraceRing::new(DEFAULT_TRACE_CAPACITY));
        let start = Instant::now();
        let scheduler = Scheduler::new(tracks, num_worker_threads, Arc::clone(&trace), start);

        Self {
            bpm,
            sample_rate,
            length_seconds,
            scheduler,
            trace,
            start,
            render_samples_calls: AtomicI32::new(0),
        }
    }

    pub fn get_tempo(&self) -> i32 {
        self.bpm
    }

    pub fn get_sample_rate(&self) -> i32 {
        self.sample_rate
    }

    pub fn get_length(&self) -> f64 {
        self.length_seconds
    }

    pub fn trace_events(&self) -> Vec<TraceEvent> {
        self.trace.events()
    }

    /// §4.3, steps 1-5. `out.len()` must be even; one trailing sample is silently
    /// dropped otherwise (an odd count violates the §3 invariant and is the
    /// caller's responsibility to avoid).
    pub fn render_samples(&self, out: &mut [i16]) {
        let _denormal_guard = DenormalGuard::install();
        let pid = current_pid();
        let tid = current_tid();
        let call_index = self.render_samples_calls.fetch_add(1, Ordering::Relaxed);

        self.trace
            .push_render_samples(Phase::Begin, call_index, elapsed_us(self.start), pid, tid);

        let num_float_samples = out.len() / 2;
        self.scheduler.begin_block(num_float_samples);
        self.scheduler.wait_for_master();

        let master = &self.scheduler.tracks()[self.scheduler.num_tracks() - 1];
        for (i, out_sample) in out.iter_mut().enumerate() {
            let channel = i & 1;
            let frame = i >> 1;
            let scaled = master.sample(channel, frame) * 32767.0;
            let truncated = scaled as i32;
            *out_sample = truncated.clamp(-32768, 32767) as i16;
        }

        self.trace
            .push_render_samples(Phase::End, call_index, elapsed_us(self.start), pid, tid);
    }
}
