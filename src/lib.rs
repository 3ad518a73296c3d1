//! # framefeed
//!
//! Pull decoded video frames out of container files as raw pixel buffers.
//!
//! `framefeed` opens a media container, picks a video stream, and hands you
//! its frames one by one as tightly-packed HWC byte buffers in a resolution,
//! channel count, and element type you choose — powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate. It is aimed
//! at consumers such as training pipelines that want pixel data without
//! touching codec machinery.
//!
//! ## Quick Start
//!
//! ### Read frames at a fixed size
//!
//! ```no_run
//! use framefeed::{OutputFormat, VideoReader};
//!
//! let mut reader = VideoReader::open("input.mp4").unwrap();
//! let format = OutputFormat::rgb8(64, 64).unwrap();
//! while let Some(frame) = reader.next_frame(Some(&format)).unwrap() {
//!     assert_eq!(frame.shape(), (64, 64, 3));
//!     // frame.as_bytes() is 64 * 64 * 3 tightly packed bytes
//! }
//! ```
//!
//! ### Reuse one output buffer
//!
//! ```no_run
//! use framefeed::{FrameBuffer, OutputFormat, VideoReader};
//!
//! let mut reader = VideoReader::open("input.mp4").unwrap();
//! let format = OutputFormat::gray8(128, 128).unwrap();
//! let mut buffer = FrameBuffer::for_format(&format);
//! while reader.next_frame_into(&format, &mut buffer).unwrap() {
//!     // buffer now holds the latest frame
//! }
//! ```
//!
//! ### Inspect streams
//!
//! ```no_run
//! use framefeed::VideoReader;
//!
//! let reader = VideoReader::open("input.mkv").unwrap();
//! for info in reader.stream_infos() {
//!     println!("{info}");
//! }
//! ```
//!
//! ## Model
//!
//! - **One reader, one file, one thread.** A [`VideoReader`] exclusively owns
//!   its demuxer, decoder, frame holders, and converter cache. Run
//!   independent readers on separate threads for parallelism.
//! - **Sequential access.** Frames are delivered in decode order;
//!   end-of-stream is a value (`None` / `false`), not an error.
//! - **Cached converters.** Each distinct [`OutputFormat`] gets exactly one
//!   colorspace/scale converter per reader; reselecting the active stream
//!   rebuilds the cache against the new native geometry.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod buffer;
mod converter;
pub mod error;
pub mod ffmpeg;
pub mod format;
pub mod reader;
pub mod streams;

pub use buffer::FrameBuffer;
pub use error::FrameFeedError;
pub use ffmpeg::{NativeLogLevel, set_native_log_level};
pub use format::{ElementType, Interpolation, OutputFormat};
pub use reader::VideoReader;
pub use streams::{StreamInfo, StreamKind};
