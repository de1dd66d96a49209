//! Byte-level helpers shared by the descriptor and record decoders

pub mod datetime;
pub mod endian;
pub mod sector;
pub mod string;
