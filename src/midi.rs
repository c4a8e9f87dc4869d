//! MIDI lanes: sorted note-on/off timelines owned by the renderer and bound to
//! tracks by shared reference (a lane may be bound by more than one track).

use crate::blob::BlobReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub time_stamp: i32,
    pub note: u8,
    pub velocity: u8,
    pub is_note_off: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MidiLane {
    pub events: Vec<MidiEvent>,
}

impl MidiLane {
    pub(crate) fn read_from(reader: &mut BlobReader) -> Self {
        let num_events = reader.read_i32() as usize;
        let mut events = Vec::with_capacity(num_events);
        for _ in 0..num_events {
            let time_stamp = reader.read_i32();
            let note_byte = reader.read_byte();
            let is_note_off = note_byte & 0x80 != 0;
            let note = note_byte & 0x7F;
            let velocity = if is_note_off { 0 } else { reader.read_byte() };
            events.push(MidiEvent {
                time_stamp,
                note,
                velocity,
                is_note_off,
            });
        }
        Self { events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_note_on(blob: &mut Vec<u8>, time_stamp: i32, note: u8, velocity: u8) {
        blob.extend_from_slice(&time_stamp.to_ne_bytes());
        blob.push(note & 0x7F);
        blob.push(velocity);
    }

    fn push_note_off(blob: &mut Vec<u8>, time_stamp: i32, note: u8) {
        blob.extend_from_slice(&time_stamp.to_ne_bytes());
        blob.push((note & 0x7F) | 0x80);
    }

    #[test]
    fn note_off_has_no_velocity_byte_and_implicit_zero() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&2i32.to_ne_bytes()); // num_events
        push_note_on(&mut blob, 0, 60, 100);
        push_note_off(&mut blob, 10, 60);

        let mut reader = BlobReader::new(&blob);
        let lane = MidiLane::read_from(&mut reader);

        assert_eq!(lane.events.len(), 2);
        assert_eq!(
            lane.events[0],
            MidiEvent {
                time_stamp: 0,
                note: 60,
                velocity: 100,
                is_note_off: false,
            }
        );
        assert_eq!(
            lane.events[1],
            MidiEvent {
                time_stamp: 10,
                note: 60,
                velocity: 0,
                is_note_off: true,
            }
        );
        assert_eq!(reader.position(), blob.len());
    }

    #[test]
    fn high_bit_of_note_byte_is_masked_off() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&1i32.to_ne_bytes());
        push_note_off(&mut blob, 0, 127);

        let mut reader = BlobReader::new(&blob);
        let lane = MidiLane::read_from(&mut reader);
        assert_eq!(lane.events[0].note, 127);
    }
}
