//! # Sample Codec
//!
//! Encodes a buffer of normalized f32 audio samples into a base64 string for
//! shipment to the remote voice-processing service.
//!
//! ## Pipeline:
//! 1. **Clamp** every sample to [-1.0, 1.0]
//! 2. **Quantize** to signed 16-bit PCM with asymmetric scaling
//! 3. **Serialize** the samples as little-endian bytes
//! 4. **Base64-encode** the bytes in bounded chunks
//!
//! The decode side (remote) reverses steps 4→1 with the same little-endian,
//! signed-16-bit, standard-base64 convention. The only lossy step is the
//! float→int16 quantization; the text transport is bit-exact.

use crate::error::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use byteorder::{LittleEndian, WriteBytesExt};
use tracing::error;

/// How many raw bytes each base64 pass consumes.
///
/// Underlying encoders may impose a maximum argument size, so the byte stream
/// is processed in bounded chunks and the encoded chunks are concatenated.
/// The size must be a multiple of 3: every chunk then encodes to a whole
/// number of base64 quads with no padding, which makes the concatenation of
/// chunk encodings byte-identical to a single whole-buffer encoding.
const ENCODE_CHUNK_BYTES: usize = 32 * 1024 - 2;  // just under 32 KiB, divisible by 3

/// Quantize a single clamped sample to signed 16-bit PCM.
///
/// ## Asymmetric scaling:
/// The i16 range is [-32768, 32767]. Scaling negatives by 32768 and
/// non-negatives by 32767 maps -1.0 and +1.0 onto the exact range endpoints
/// without overflow at +1.0.
fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Encode a buffer of normalized f32 samples into transport-safe text.
///
/// ## Parameters:
/// - **samples**: Captured audio, nominally in [-1.0, 1.0]. Out-of-range
///   values are clamped; the input is never mutated.
///
/// ## Returns:
/// - **Ok(String)**: Standard base64 of the little-endian 16-bit PCM bytes
/// - **Err(AppError::Encoding)**: The buffer contained NaN or infinite
///   samples. The error is logged and returned, never swallowed; callers
///   must not treat it as "empty audio".
pub fn encode_samples(samples: &[f32]) -> AppResult<String> {
    encode_with_chunk_size(samples, ENCODE_CHUNK_BYTES)
}

/// Encoding core with an explicit chunk size, kept separate so tests can
/// verify that chunking never changes the output.
fn encode_with_chunk_size(samples: &[f32], chunk_bytes: usize) -> AppResult<String> {
    debug_assert!(chunk_bytes > 0 && chunk_bytes % 3 == 0);

    // Reject non-finite input before touching the quantizer: NaN and infinity
    // have no meaningful 16-bit representation and a garbled payload is worse
    // than a failed one.
    if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
        error!(sample_index = pos, "Refusing to encode non-finite audio sample");
        return Err(AppError::Encoding(format!(
            "non-finite sample at index {}",
            pos
        )));
    }

    // Quantize and serialize as little-endian bytes. The byte order is fixed
    // (not platform-native) because the consumer decodes on a different runtime.
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes
            .write_i16::<LittleEndian>(quantize(sample))
            .map_err(|e| {
                error!(error = %e, "PCM serialization failed");
                AppError::Encoding(format!("PCM serialization failed: {}", e))
            })?;
    }

    // Base64 over bounded chunks of the raw bytes. Each chunk is a multiple
    // of 3 bytes, so the concatenated output equals a whole-buffer encoding.
    let mut encoded = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(chunk_bytes) {
        encoded.push_str(&general_purpose::STANDARD.encode(chunk));
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decode helper mirroring what the remote consumer does: base64 → bytes
    /// → little-endian i16 samples.
    fn decode(payload: &str) -> Vec<i16> {
        let bytes = general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(bytes.len() % 2, 0);
        bytes
            .chunks(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    #[test]
    fn test_round_trip_matches_direct_quantization() {
        let samples = vec![0.0f32, 0.25, -0.25, 0.5, -0.5, 1.0, -1.0, 0.999, -0.999];
        let payload = encode_samples(&samples).unwrap();
        let decoded = decode(&payload);

        let expected: Vec<i16> = samples.iter().map(|&s| quantize(s)).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_range_endpoints_hit_exact_i16_bounds() {
        let payload = encode_samples(&[1.0, -1.0]).unwrap();
        assert_eq!(decode(&payload), vec![32767, -32768]);
    }

    #[test]
    fn test_clamping_out_of_range_samples() {
        // 1.5 / -1.5 must encode identically to 1.0 / -1.0
        let clamped = encode_samples(&[1.5, -1.5]).unwrap();
        let exact = encode_samples(&[1.0, -1.0]).unwrap();
        assert_eq!(clamped, exact);
    }

    #[test]
    fn test_chunk_invariance() {
        // Lengths around the chunk boundary: 0, 1, chunk±1 samples, and a few
        // chunk multiples. Chunk sizes must all be multiples of 3.
        let chunk = 6usize;  // 6 bytes = 3 samples per chunk
        let boundary_samples = chunk / 2;
        let lengths = [
            0,
            1,
            boundary_samples - 1,
            boundary_samples,
            boundary_samples + 1,
            boundary_samples * 4,
            boundary_samples * 7 + 2,
        ];

        for len in lengths {
            let samples: Vec<f32> = (0..len)
                .map(|i| ((i as f32) * 0.37).sin())
                .collect();

            let whole = general_purpose::STANDARD.encode(
                samples
                    .iter()
                    .flat_map(|&s| quantize(s).to_le_bytes())
                    .collect::<Vec<u8>>(),
            );

            for chunk_bytes in [6, 12, 32 * 1024 - 2] {
                let chunked = encode_with_chunk_size(&samples, chunk_bytes).unwrap();
                assert_eq!(chunked, whole, "len={} chunk={}", len, chunk_bytes);
            }

            // The public entry point must agree too
            assert_eq!(encode_samples(&samples).unwrap(), whole, "len={}", len);
        }
    }

    #[test]
    fn test_empty_buffer_encodes_to_empty_string() {
        assert_eq!(encode_samples(&[]).unwrap(), "");
    }

    #[test]
    fn test_non_finite_samples_are_rejected() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let result = encode_samples(&[0.1, bad, 0.2]);
            match result {
                Err(AppError::Encoding(msg)) => assert!(msg.contains("index 1")),
                other => panic!("expected Encoding error, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_input_not_mutated_and_deterministic() {
        let samples = vec![0.1f32, -0.2, 0.3];
        let first = encode_samples(&samples).unwrap();
        let second = encode_samples(&samples).unwrap();
        assert_eq!(first, second);
        assert_eq!(samples, vec![0.1f32, -0.2, 0.3]);
    }
}
