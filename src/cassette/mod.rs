//! Record/replay infrastructure for deterministic testing.
//!
//! A cassette is a YAML file of port calls and their outcomes. Setting
//! `PHOTOSTUDIO_REC=1` records one; `PHOTOSTUDIO_REPLAY=<path>` serves it back.

pub mod format;
pub mod recorder;
pub mod replayer;
