//! The video reader session.
//!
//! [`VideoReader`] is the main entry point of the crate. It owns the open
//! container, the stream table, the active stream's decoder, the reusable
//! frame holders, and the converter cache, and it exposes stream selection,
//! stream introspection, and sequential frame retrieval.
//!
//! The model is fully synchronous and single-owner: every call runs to
//! completion on the calling thread, and one reader must never be shared
//! between threads. Independent readers over different files are fully
//! isolated and may run in parallel.

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
};

use crate::{
    buffer::FrameBuffer,
    converter::{self, ConverterCache},
    error::FrameFeedError,
    format::{ElementType, Interpolation, OutputFormat},
    streams::{StreamInfo, StreamKind, StreamTable},
};

/// The currently selected stream and its opened decoder.
struct ActiveStream {
    index: usize,
    decoder: VideoDecoder,
}

/// Channel count implied by a decoder's native pixel format.
fn native_channels(format: Pixel) -> u32 {
    match format {
        Pixel::GRAY8
        | Pixel::GRAY16LE
        | Pixel::GRAY16BE
        | Pixel::MonoWhite
        | Pixel::MonoBlack => 1,
        _ => 3,
    }
}

/// A sequential frame reader over one container file.
///
/// Created via [`VideoReader::open`], which probes the container, builds the
/// stream table, and selects the best video stream. Frames are then pulled
/// one at a time with [`next_frame`](VideoReader::next_frame) or
/// [`next_frame_into`](VideoReader::next_frame_into); end of stream is
/// reported as `None` / `false`, never as an error.
///
/// # Example
///
/// ```no_run
/// use framefeed::{OutputFormat, VideoReader};
///
/// let mut reader = VideoReader::open("input.mp4")?;
/// let format = OutputFormat::rgb8(224, 224)?;
/// while let Some(frame) = reader.next_frame(Some(&format))? {
///     assert_eq!(frame.shape(), (224, 224, 3));
/// }
/// # Ok::<(), framefeed::FrameFeedError>(())
/// ```
pub struct VideoReader {
    /// The opened FFmpeg input (demuxer) context.
    input: Input,
    /// Source path, kept for error context.
    path: PathBuf,
    /// All elementary streams, enumerated at open time.
    streams: StreamTable,
    active: ActiveStream,
    converters: ConverterCache,
    /// Reusable raw-frame holder; valid only until the next decode overwrites it.
    decoded: VideoFrame,
    /// Reusable destination frame for the conversion stage.
    converted: VideoFrame,
    eof_sent: bool,
    exhausted: bool,
}

impl std::fmt::Debug for VideoReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The FFmpeg `Input`/`Video` handles do not implement `Debug`, so only
        // the plain-data fields are shown.
        f.debug_struct("VideoReader")
            .field("path", &self.path)
            .field("active_stream", &self.active.index)
            .field("stream_count", &self.streams.len())
            .field("eof_sent", &self.eof_sent)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl VideoReader {
    /// Open a container file for frame extraction.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, probes stream info,
    /// enumerates all elementary streams, and selects the container's best
    /// video stream as the active one.
    ///
    /// # Errors
    ///
    /// - [`FrameFeedError::FileOpen`] if the file cannot be opened or probed.
    /// - [`FrameFeedError::NoVideoStream`] if no video stream with a working
    ///   decoder exists.
    /// - [`FrameFeedError::DecoderSetup`] if the selected stream's decoder
    ///   cannot be opened.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use framefeed::VideoReader;
    ///
    /// let reader = VideoReader::open("video.mp4")?;
    /// println!("{} streams", reader.stream_count());
    /// # Ok::<(), framefeed::FrameFeedError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameFeedError> {
        let path = path.as_ref().to_path_buf();

        ffmpeg_next::init().map_err(|error| FrameFeedError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        // Opens the file and probes stream info in one step.
        let input = ffmpeg_next::format::input(&path).map_err(|error| {
            FrameFeedError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            }
        })?;

        let streams = StreamTable::from_input(&input);

        log::info!(
            "Opened {}: format={}, {} streams",
            path.display(),
            input.format().name(),
            streams.len(),
        );

        let index = Self::resolve_stream_index(&input, &streams, None)?;
        let decoder = Self::open_decoder(&input, &streams, index)?;
        let converters =
            ConverterCache::new(decoder.width(), decoder.height(), decoder.format());

        log::debug!(
            "Selected video stream {index}: {}x{} {:?}",
            decoder.width(),
            decoder.height(),
            decoder.format(),
        );

        Ok(Self {
            input,
            path,
            streams,
            active: ActiveStream { index, decoder },
            converters,
            decoded: VideoFrame::empty(),
            converted: VideoFrame::empty(),
            eof_sent: false,
            exhausted: false,
        })
    }

    /// Switch the active stream.
    ///
    /// `stream_index` of `None` re-runs the container's best-video-stream
    /// heuristic; `Some(index)` must name a video stream with a resolvable
    /// decoder. The previous decoder context is torn down, a fresh one is
    /// opened from the stream's codec parameters, and the converter cache is
    /// invalidated — its entries were bound to the previous stream's native
    /// geometry.
    ///
    /// # Errors
    ///
    /// - [`FrameFeedError::StreamNotDecodable`] if the index does not name a
    ///   decodable video stream.
    /// - [`FrameFeedError::NoVideoStream`] if auto-selection finds nothing.
    /// - [`FrameFeedError::DecoderSetup`] if the decoder fails to open.
    pub fn select_stream(&mut self, stream_index: Option<usize>) -> Result<(), FrameFeedError> {
        let index = Self::resolve_stream_index(&self.input, &self.streams, stream_index)?;
        let decoder = Self::open_decoder(&self.input, &self.streams, index)?;

        log::debug!(
            "Selected video stream {index}: {}x{} {:?}",
            decoder.width(),
            decoder.height(),
            decoder.format(),
        );

        self.converters =
            ConverterCache::new(decoder.width(), decoder.height(), decoder.format());
        // Dropping the previous ActiveStream releases its decoder context.
        self.active = ActiveStream { index, decoder };
        self.eof_sent = false;
        self.exhausted = false;
        Ok(())
    }

    /// Log one diagnostic line per elementary stream and return the count.
    ///
    /// Pure observer; decoding state is untouched.
    pub fn query_streams(&self) -> usize {
        self.streams.log_streams();
        self.streams.len()
    }

    /// Number of elementary streams in the container.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Diagnostic snapshots for all streams, in container order.
    pub fn stream_infos(&self) -> impl Iterator<Item = &StreamInfo> {
        self.streams.infos()
    }

    /// Diagnostic snapshot for one stream.
    pub fn stream_info(&self, index: usize) -> Option<&StreamInfo> {
        self.streams.entry(index).map(|entry| &entry.info)
    }

    /// Index of the currently active video stream.
    pub fn active_stream_index(&self) -> usize {
        self.active.index
    }

    /// Native `(height, width)` of the active decoder.
    pub fn native_size(&self) -> (u32, u32) {
        (self.active.decoder.height(), self.active.decoder.width())
    }

    /// Native pixel format of the active decoder.
    pub fn native_pixel_format(&self) -> Pixel {
        self.active.decoder.format()
    }

    /// Source path this reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The default output format: native geometry, implied channel count,
    /// 8-bit samples, bilinear resampling.
    pub fn native_output_format(&self) -> Result<OutputFormat, FrameFeedError> {
        OutputFormat::new(
            self.active.decoder.height(),
            self.active.decoder.width(),
            native_channels(self.active.decoder.format()),
            ElementType::Uint8,
            Interpolation::Bilinear,
        )
    }

    /// Decode the next frame and return it in a newly allocated buffer.
    ///
    /// When `format` is `None` the frame is delivered in the
    /// [native output format](VideoReader::native_output_format). Returns
    /// `Ok(None)` at end of stream — idempotently, so callers may keep
    /// polling.
    ///
    /// # Errors
    ///
    /// Any fatal decode, read, or conversion failure; see
    /// [`next_frame_into`](VideoReader::next_frame_into).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use framefeed::VideoReader;
    ///
    /// let mut reader = VideoReader::open("input.mp4")?;
    /// let mut count = 0;
    /// while reader.next_frame(None)?.is_some() {
    ///     count += 1;
    /// }
    /// println!("{count} frames");
    /// # Ok::<(), framefeed::FrameFeedError>(())
    /// ```
    pub fn next_frame(
        &mut self,
        format: Option<&OutputFormat>,
    ) -> Result<Option<FrameBuffer>, FrameFeedError> {
        let format = match format {
            Some(format) => format.clone(),
            None => self.native_output_format()?,
        };
        let mut buffer = FrameBuffer::for_format(&format);
        if self.next_frame_into(&format, &mut buffer)? {
            Ok(Some(buffer))
        } else {
            Ok(None)
        }
    }

    /// Decode the next frame into a caller-supplied buffer.
    ///
    /// Reads packets until the active stream's decoder yields a complete
    /// frame, converts it to `format` via the converter cache, and writes the
    /// pixels into `buffer`. Packets belonging to other streams are
    /// discarded. Returns `Ok(false)` once the container is exhausted and the
    /// decoder fully drained; every later call also returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// - [`FrameFeedError::ShapeMismatch`] if `buffer` does not match
    ///   `format` — checked before any packet is consumed, so no pixel data
    ///   is written and no frame is lost.
    /// - [`FrameFeedError::PacketRead`] on a real I/O failure (never for
    ///   ordinary end-of-stream).
    /// - [`FrameFeedError::Decode`] if the decoder rejects a packet.
    /// - [`FrameFeedError::ConverterSetup`] if the converter cannot be built.
    pub fn next_frame_into(
        &mut self,
        format: &OutputFormat,
        buffer: &mut FrameBuffer,
    ) -> Result<bool, FrameFeedError> {
        converter::ensure_layout(format, buffer)?;

        if !self.advance()? {
            return Ok(false);
        }

        let scaler = self.converters.get(format)?;
        converter::materialize(scaler, &self.decoded, format, &mut self.converted, buffer)?;
        Ok(true)
    }

    /// Drive the demux→decode loop until a complete frame lands in
    /// `self.decoded` or the stream is exhausted.
    fn advance(&mut self) -> Result<bool, FrameFeedError> {
        if self.exhausted {
            return Ok(false);
        }

        loop {
            // Drain any frame the decoder has already produced.
            if self.active.decoder.receive_frame(&mut self.decoded).is_ok() {
                return Ok(true);
            }

            if self.eof_sent {
                // EOF delivered and the decoder is fully drained.
                self.exhausted = true;
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.active.index {
                        self.active
                            .decoder
                            .send_packet(&packet)
                            .map_err(|error| FrameFeedError::Decode(error.to_string()))?;
                    }
                    // Packets for inactive streams are dropped, never buffered.
                }
                Err(FfmpegError::Eof) => {
                    // Normal end of container: flush the decoder's internal
                    // buffer before reporting exhaustion.
                    self.active
                        .decoder
                        .send_eof()
                        .map_err(|error| FrameFeedError::Decode(error.to_string()))?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    return Err(FrameFeedError::PacketRead {
                        path: self.path.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }
    }

    /// Resolve the stream index to activate.
    fn resolve_stream_index(
        input: &Input,
        streams: &StreamTable,
        requested: Option<usize>,
    ) -> Result<usize, FrameFeedError> {
        match requested {
            Some(index) => {
                if streams.is_decodable_video(index) {
                    return Ok(index);
                }
                let reason = match streams.entry(index) {
                    None => "no such stream".to_string(),
                    Some(entry) if entry.kind != StreamKind::Video => {
                        format!("stream is {}", entry.kind)
                    }
                    Some(_) => "no decoder available".to_string(),
                };
                Err(FrameFeedError::StreamNotDecodable {
                    stream_index: index,
                    reason,
                })
            }
            None => input
                .streams()
                .best(Type::Video)
                .map(|stream| stream.index())
                .filter(|&index| streams.is_decodable_video(index))
                .or_else(|| streams.first_decodable_video())
                .ok_or(FrameFeedError::NoVideoStream),
        }
    }

    /// Open a fresh decoder context from the stream's codec parameters.
    fn open_decoder(
        input: &Input,
        streams: &StreamTable,
        index: usize,
    ) -> Result<VideoDecoder, FrameFeedError> {
        let stream = input
            .stream(index)
            .ok_or_else(|| FrameFeedError::StreamNotDecodable {
                stream_index: index,
                reason: "no such stream".to_string(),
            })?;

        let codec = streams
            .entry(index)
            .and_then(|entry| entry.codec)
            .ok_or_else(|| FrameFeedError::StreamNotDecodable {
                stream_index: index,
                reason: "no decoder available".to_string(),
            })?;

        let context = CodecContext::from_parameters(stream.parameters()).map_err(|error| {
            FrameFeedError::DecoderSetup {
                stream_index: index,
                reason: format!("failed to read codec parameters: {error}"),
            }
        })?;

        context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(|error| FrameFeedError::DecoderSetup {
                stream_index: index,
                reason: error.to_string(),
            })
    }
}
