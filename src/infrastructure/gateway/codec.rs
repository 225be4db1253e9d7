use flate2::{Decompress, FlushDecompress, Status};

use super::constants::MAX_DECOMPRESSED_SIZE;
use super::payloads::Envelope;
use crate::domain::errors::{GatewayError, GatewayResult};
use crate::domain::ports::Frame;

const INITIAL_BUFFER_SIZE: usize = 32 * 1024;

/// Turns raw inbound frames into envelopes.
///
/// Binary frames are complete zlib documents and are inflated in one shot;
/// nothing is carried over between frames.
pub struct PayloadDecoder {
    max_size: usize,
}

impl PayloadDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_size: MAX_DECOMPRESSED_SIZE,
        }
    }

    #[must_use]
    pub const fn with_max_size(max_size: usize) -> Self {
        Self { max_size }
    }

    /// # Errors
    ///
    /// Returns a compression or serialization error; the frame should be dropped.
    pub fn decode(&self, frame: &Frame) -> GatewayResult<Envelope> {
        match frame {
            Frame::Text(text) => Self::parse_envelope(text),
            Frame::Binary(data) => {
                let text = self.inflate(data)?;
                Self::parse_envelope(&text)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `SerializationError` when the text is not a valid envelope.
    pub fn parse_envelope(json: &str) -> GatewayResult<Envelope> {
        serde_json::from_str(json).map_err(|e| GatewayError::serialization(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `CompressionError` for corrupt, truncated, oversized, or non-UTF-8 input.
    pub fn inflate(&self, data: &[u8]) -> GatewayResult<String> {
        let mut inflater = Decompress::new(true);
        let mut output: Vec<u8> =
            Vec::with_capacity(INITIAL_BUFFER_SIZE.min(self.max_size.max(1)));
        let mut consumed = 0;

        loop {
            if output.len() == output.capacity() {
                if output.len() >= self.max_size {
                    return Err(GatewayError::compression(
                        "decompressed data exceeds maximum size",
                    ));
                }
                let extra = output.capacity().min(self.max_size - output.len()).max(1);
                output.reserve_exact(extra);
            }

            let in_before = inflater.total_in();
            let out_before = inflater.total_out();

            let status = inflater
                .decompress_vec(&data[consumed..], &mut output, FlushDecompress::None)
                .map_err(|e| GatewayError::compression(e.to_string()))?;

            let read = usize::try_from(inflater.total_in() - in_before).unwrap_or(0);
            let written = inflater.total_out() - out_before;
            consumed += read;

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    let has_room = output.len() < output.capacity();
                    if read == 0 && written == 0 && has_room {
                        return Err(GatewayError::compression("truncated compressed frame"));
                    }
                }
            }
        }

        String::from_utf8(output).map_err(|e| GatewayError::compression(format!("invalid UTF-8: {e}")))
    }
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::new()
    }
}
