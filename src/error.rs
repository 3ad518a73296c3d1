//! Error types for the `framefeed` crate.
//!
//! This module defines [`FrameFeedError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context to
//! diagnose the problem without additional logging at the call site: the file
//! path for open failures, stream indices for selection failures, and both
//! byte sizes for buffer-layout mismatches.
//!
//! End-of-stream is deliberately *not* an error. Frame retrieval reports it as
//! `Ok(false)` / `Ok(None)`; every variant below describes a condition after
//! which the reader should be discarded.

use std::path::PathBuf;

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `framefeed` operations.
///
/// Every public method that can fail returns `Result<T, FrameFeedError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameFeedError {
    /// The container file could not be opened or probed.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoReader::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container has no video stream with a resolvable decoder.
    #[error("No decodable video stream found in file")]
    NoVideoStream,

    /// The requested stream index does not name a decodable video stream.
    #[error("Stream {stream_index} is not a decodable video stream ({reason})")]
    StreamNotDecodable {
        /// The stream index that was requested.
        stream_index: usize,
        /// Why the stream cannot be decoded.
        reason: String,
    },

    /// A decoder context could not be allocated or opened.
    #[error("Failed to set up decoder for stream {stream_index}: {reason}")]
    DecoderSetup {
        /// The stream the decoder belongs to.
        stream_index: usize,
        /// Underlying reason the setup failed.
        reason: String,
    },

    /// Reading a packet from the container failed with a real I/O error.
    ///
    /// Normal end-of-stream never produces this variant.
    #[error("Failed to read packet from {path}: {reason}")]
    PacketRead {
        /// Path of the file being demuxed.
        path: PathBuf,
        /// Underlying reason the read failed.
        reason: String,
    },

    /// Submitting a packet to the decoder, or draining it, failed.
    #[error("Failed to decode video frame: {0}")]
    Decode(String),

    /// A colorspace/scale converter could not be constructed.
    #[error("Failed to build frame converter ({src} -> {target}): {reason}")]
    ConverterSetup {
        /// Native geometry and pixel format being converted from.
        src: String,
        /// Requested geometry and pixel format being converted to.
        target: String,
        /// Underlying reason the construction failed.
        reason: String,
    },

    /// An output format was requested with a channel count other than 1 or 3.
    #[error(
        "Unsupported channel count {channels} (only 3-channel RGB and 1-channel gray output is supported)"
    )]
    InvalidChannelCount {
        /// The channel count that was requested.
        channels: u32,
    },

    /// An output format was requested with a zero width or height.
    #[error("Output dimensions must be non-zero (got {height}x{width})")]
    ZeroDimension {
        /// Requested height.
        height: u32,
        /// Requested width.
        width: u32,
    },

    /// A caller-supplied buffer does not match the requested output layout.
    ///
    /// Raised before any pixel data is written; the buffer contents are left
    /// untouched.
    #[error(
        "Output buffer layout mismatch: expected {expected} bytes ({expected_shape}), got {actual} bytes"
    )]
    ShapeMismatch {
        /// Byte size the requested output format requires.
        expected: usize,
        /// Human-readable shape of the requested format.
        expected_shape: String,
        /// Byte size of the buffer that was supplied.
        actual: usize,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

impl From<FfmpegError> for FrameFeedError {
    fn from(error: FfmpegError) -> Self {
        FrameFeedError::Ffmpeg(error.to_string())
    }
}
