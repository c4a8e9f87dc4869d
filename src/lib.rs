//! # songrender
//!
//! A multi-threaded renderer for pre-authored musical compositions. A [`Song`] blob
//! describes a DAG of [`Track`]s that send audio to one another by index; [`Renderer`]
//! owns a pool of worker threads that race to render `Idle` tracks whose upstream
//! sends have all `Finished`, and exposes a single `render_samples` entry point that
//! blocks until the terminal (master) track completes and hands back interleaved
//! 16-bit stereo PCM.
//!
//! ## Quick start
//!
//! ```no_run
//! use songrender::{Renderer, devices::demo_device_factory};
//!
//! let blob = std::fs::read("song.blob").unwrap();
//! let renderer = Renderer::new(&blob, 3, demo_device_factory);
//!
//! let mut out = vec![0i16; 1024];
//! renderer.render_samples(&mut out);
//! ```
//!
//! The renderer itself never touches disk, never decodes device-specific DSP state,
//! and never mixes down below two channels — see `SPEC_FULL.md` for the full
//! component breakdown.

pub mod blob;
pub mod denormal;
pub mod device;
pub mod devices;
pub mod midi;
pub mod renderer;
pub mod scheduler;
pub mod trace;
pub mod track;

pub use device::{Device, DeviceFactory, DeviceId};
pub use midi::{MidiEvent, MidiLane};
pub use renderer::Renderer;
pub use track::{Receive, Track};
