//! A couple of deliberately trivial [`Device`] implementations.
//!
//! The core treats devices as opaque external collaborators (§1 non-goals); these
//! exist only so the renderer is exercisable end-to-end in tests and the demo
//! binary, in the same spirit as the teacher codebase's own `ConstantNode` — the
//! simplest possible node that still honors the real trait.

use crate::device::{Device, DeviceId};

/// Outputs nothing. Used by the "silence" scenario and as a harmless default.
pub struct SilenceDevice;

impl Device for SilenceDevice {
    fn set_sample_rate(&mut self, _sample_rate: f32) {}
    fn set_tempo(&mut self, _bpm: i32) {}
    fn set_chunk(&mut self, _chunk: &[u8]) {}
    fn process_block(&mut self, _left: &mut [f32], _right: &mut [f32]) {}
}

/// Adds a fixed value to every sample of both channels every block. Its chunk is
/// two little-endian `f32`s: left value, then right value.
pub struct ConstantDevice {
    left: f32,
    right: f32,
}

impl ConstantDevice {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

impl Device for ConstantDevice {
    fn set_sample_rate(&mut self, _sample_rate: f32) {}
    fn set_tempo(&mut self, _bpm: i32) {}

    fn set_chunk(&mut self, chunk: &[u8]) {
        if chunk.len() >= 8 {
            self.left = f32::from_ne_bytes(chunk[0..4].try_into().unwrap());
            self.right = f32::from_ne_bytes(chunk[4..8].try_into().unwrap());
        }
    }

    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for s in left.iter_mut() {
            *s += self.left;
        }
        for s in right.iter_mut() {
            *s += self.right;
        }
    }
}

/// Device id 0 is silence, device id 1 is a constant-value device (configured via
/// its blob chunk). Any other id is unrecognized and, per the core's error design,
/// a fatal condition — this factory panics rather than returning a stand-in.
pub fn demo_device_factory(id: DeviceId) -> Box<dyn Device> {
    match id {
        0 => Box::new(SilenceDevice),
        1 => Box::new(ConstantDevice::new(0.0, 0.0)),
        other => panic!("demo_device_factory: unrecognized device id {other}"),
    }
}
