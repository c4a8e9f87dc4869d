//! Tracks: DAG nodes that sum their upstream receives, run their hosted devices,
//! and expose the resulting two-channel buffer to whoever receives from them next.

use std::sync::{Arc, Mutex};

use crate::device::Device;
use crate::midi::MidiLane;

/// A directed edge from an upstream (sending) track to this track, with a gain
/// applied when summing. `sending_track_index` is always strictly less than the
/// owning track's own index (§3's DAG invariant).
#[derive(Debug, Clone, Copy)]
pub struct Receive {
    pub sending_track_index: usize,
    pub gain: f32,
}

pub struct Track {
    pub index: usize,
    pub receives: Vec<Receive>,
    devices: Mutex<Vec<Box<dyn Device>>>,
    midi: Vec<Arc<MidiLane>>,
    buffers: Mutex<[Vec<f32>; 2]>,
}

impl Track {
    pub fn new(
        index: usize,
        receives: Vec<Receive>,
        devices: Vec<Box<dyn Device>>,
        midi: Vec<Arc<MidiLane>>,
    ) -> Self {
        Self {
            index,
            receives,
            devices: Mutex::new(devices),
            midi,
            buffers: Mutex::new([Vec::new(), Vec::new()]),
        }
    }

    pub fn midi_lanes(&self) -> &[Arc<MidiLane>] {
        &self.midi
    }

    /// Renders `num_float_samples` per channel: clears the buffer, sums gain-scaled
    /// receives from already-`Finished` upstream tracks, then runs this track's
    /// hosted devices additively over the result.
    ///
    /// Safety of reading `tracks[r.sending_track_index]` concurrently with that
    /// track's own (past) `run` call is guaranteed by the scheduler's state
    /// machine, not by any lock ordering here: a receive is only readable once the
    /// scheduler has observed its sender as `Finished`, which happens-before this
    /// call via the scheduler mutex (see SPEC_FULL.md §5).
    pub fn run(&self, num_float_samples: usize, tracks: &[Track]) {
        let mut buffers = self.buffers.lock().unwrap();
        for channel in buffers.iter_mut() {
            channel.clear();
            channel.resize(num_float_samples, 0.0);
        }

        for receive in &self.receives {
            let upstream = tracks[receive.sending_track_index].buffers.lock().unwrap();
            for channel in 0..2 {
                for i in 0..num_float_samples {
                    buffers[channel][i] += upstream[channel][i] * receive.gain;
                }
            }
        }

        let mut devices = self.devices.lock().unwrap();
        let [left, right] = &mut *buffers;
        for device in devices.iter_mut() {
            device.process_block(left, right);
        }
    }

    /// Reads a sample from the track's current buffer. Only valid to call once the
    /// scheduler has observed this track as `Finished` for the current block.
    pub fn sample(&self, channel: usize, frame: usize) -> f32 {
        self.buffers.lock().unwrap()[channel][frame]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ConstantDevice;

    #[test]
    fn run_sums_gain_scaled_receives() {
        let sender = Track::new(0, vec![], vec![Box::new(ConstantDevice::new(0.5, 0.5))], vec![]);
        sender.run(4, &[]);

        let tracks = vec![sender];
        let receiver = Track::new(
            1,
            vec![Receive {
                sending_track_index: 0,
                gain: 2.0,
            }],
            vec![],
            vec![],
        );
        receiver.run(4, &tracks);

        assert_eq!(receiver.sample(0, 0), 1.0);
        assert_eq!(receiver.sample(1, 0), 1.0);
    }

    #[test]
    fn run_clears_buffer_before_each_block() {
        let track = Track::new(0, vec![], vec![Box::new(ConstantDevice::new(1.0, 1.0))], vec![]);
        track.run(2, &[]);
        track.run(2, &[]);
        // Device adds 1.0 each call; a buffer that wasn't cleared would accumulate.
        assert_eq!(track.sample(0, 0), 1.0);
    }
}
