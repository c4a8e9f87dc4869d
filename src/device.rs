//! The device contract: an opaque DSP unit hosted by exactly one [`crate::Track`].
//!
//! Devices are external collaborators — this crate never implements real synthesis
//! or effects DSP, only the uniform shape a track drives them through. See
//! `src/devices.rs` for the minimal example devices used by tests and the demo
//! binary.

/// The byte tag read from the blob that selects which kind of device to construct.
pub type DeviceId = u8;

/// Allocates a device for the given id. Returning a device for an id the factory
/// doesn't recognize is the caller's responsibility to avoid — an unrecognized id
/// is a fatal, unchecked condition per the core's error-handling design (§7).
pub type DeviceFactory = fn(DeviceId) -> Box<dyn Device>;

/// Uniform DSP contract every hosted device implements.
pub trait Device: Send {
    /// Called once, immediately after construction.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Called once, immediately after construction.
    fn set_tempo(&mut self, bpm: i32);

    /// Called once, immediately after construction, with the device's chunk of the
    /// blob verbatim for state restore.
    fn set_chunk(&mut self, chunk: &[u8]);

    /// Processes one block in place, additively mixing into `left`/`right`.
    /// Devices add to the existing buffer contents rather than overwrite them, so
    /// multiple devices hosted by the same track can be summed.
    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]);
}
