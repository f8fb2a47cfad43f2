//! Recording time values

mod duration;

pub use duration::{
    format_clock, format_length, Duration, DEFAULT_MAX_DURATION_SECS, MAX_DURATION_SECS,
};
