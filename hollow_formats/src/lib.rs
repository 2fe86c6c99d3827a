//! Decoders for the binary scene-data formats.
//!
//! The only format currently implemented is the hotspot record list (`rlst`),
//! the flat little-endian stream that describes every interactive region of a
//! scene. Decoding is strict: a truncated stream is an error, while known-bad
//! field values in shipped data are clamped with a warning.

pub mod rlst;

pub use rlst::{
    decode_hotspot, decode_hotspot_list, HotspotKind, HotspotPayload, HotspotRecord, Rect,
    RegionRecord, NO_IMAGE, NO_VARIABLE,
};
