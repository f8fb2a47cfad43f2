//! Recording session domain module

mod recording_session;

pub use recording_session::{InvalidStateTransition, Recording, RecordingSession, RecordingState};
