//! Photostudio - edit an image with a natural-language instruction.
//!
//! A source image is read and base64-encoded ([`reader`]), submitted with
//! the instruction through the [`ports::ImageEditor`] port, and the
//! service's reply is normalized into an [`ports::EditResult`] holding the
//! first returned image and the first returned text.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod output;
pub mod ports;
pub mod reader;
pub mod session;
