//! # Audio Encoding Module
//!
//! Converts locally captured floating-point audio into the transport-safe
//! representation the remote voice-processing service expects.
//!
//! ## Wire Format:
//! - **Samples**: normalized f32 in [-1.0, 1.0], clamped on entry
//! - **Quantization**: signed 16-bit PCM (asymmetric scaling, see `codec`)
//! - **Byte order**: little-endian, fixed regardless of platform, because the
//!   consumer decodes on a different runtime
//! - **Transport**: standard base64 text, safe for JSON payloads
//!
//! The codec is a pure function of its input: no hidden state, input never
//! mutated, identical output for identical buffers.

pub mod codec;

pub use codec::encode_samples;
