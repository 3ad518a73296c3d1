//! Stream enumeration and introspection.
//!
//! When a container is opened, every elementary stream is recorded in a
//! [`StreamTable`]: its media kind, its resolved decoder (when one exists),
//! and a read-only [`StreamInfo`] snapshot for diagnostics. The table is
//! built once and never mutated afterwards; stream selection and decoding
//! consult it but do not change it.
//!
//! Decoder resolution is allowed to fail for individual streams — a container
//! may carry tracks in codecs the local FFmpeg build cannot decode. Only the
//! stream that is eventually selected for decoding needs a working decoder.

use std::fmt::{Display, Formatter, Result as FmtResult};

use ffmpeg_next::{
    Codec, Rational, codec::context::Context as CodecContext, format::context::Input,
    media::Type,
};

/// The media kind of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// A video track.
    Video,
    /// An audio track.
    Audio,
    /// A subtitle track.
    Subtitle,
    /// Data, attachment, or unknown streams.
    Other,
}

impl StreamKind {
    fn from_media_type(media_type: Type) -> Self {
        match media_type {
            Type::Video => StreamKind::Video,
            Type::Audio => StreamKind::Audio,
            Type::Subtitle => StreamKind::Subtitle,
            _ => StreamKind::Other,
        }
    }
}

impl Display for StreamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
            StreamKind::Subtitle => "subtitle",
            StreamKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Read-only diagnostic snapshot of one elementary stream.
///
/// Captured at open time; has no effect on decoding.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Container-level stream index.
    pub index: usize,
    /// Media kind of the stream.
    pub kind: StreamKind,
    /// Name of the resolved decoder, if one was found.
    pub decoder_name: Option<String>,
    /// Average frame rate in frames per second (0.0 when unknown).
    pub average_frame_rate: f64,
    /// Start time in stream time-base units, when the container records one.
    pub start_time: Option<i64>,
    /// Duration in stream time-base units, when the container records one.
    pub duration: Option<i64>,
    /// Bit rate in bits per second, when known.
    pub bit_rate: Option<usize>,
    /// `(width, height)` for video streams whose decoder could be probed.
    pub resolution: Option<(u32, u32)>,
}

impl Display for StreamInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} stream [{}]", self.kind, self.index)?;
        if let Some(name) = &self.decoder_name {
            write!(f, " codec={name}")?;
        }
        if let Some((width, height)) = self.resolution {
            write!(f, " resolution={width}x{height}")?;
        }
        if self.average_frame_rate > 0.0 {
            write!(f, " avg_fps={:.2}", self.average_frame_rate)?;
        }
        if let Some(start) = self.start_time {
            write!(f, " start_time={start}")?;
        }
        if let Some(duration) = self.duration {
            write!(f, " duration={duration}")?;
        }
        if let Some(bit_rate) = self.bit_rate {
            write!(f, " bit_rate={bit_rate}")?;
        }
        Ok(())
    }
}

/// One entry of the stream table.
pub(crate) struct StreamEntry {
    pub(crate) kind: StreamKind,
    /// Resolved decoder for this stream's codec, `None` when resolution
    /// failed or the stream is not video.
    pub(crate) codec: Option<Codec>,
    pub(crate) info: StreamInfo,
}

/// Every elementary stream of an opened container, enumerated once.
pub(crate) struct StreamTable {
    entries: Vec<StreamEntry>,
}

/// Rational → f64 with a zero-denominator guard.
fn rate_to_f64(rate: Rational) -> f64 {
    if rate.denominator() != 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    }
}

/// FFmpeg reports missing timestamps as `AV_NOPTS_VALUE` (`i64::MIN`).
fn timestamp_or_none(value: i64) -> Option<i64> {
    if value == i64::MIN { None } else { Some(value) }
}

impl StreamTable {
    /// Enumerate all streams of the opened container.
    ///
    /// Video streams get their decoder resolved and a probe decoder opened to
    /// capture native resolution and bit rate. Failures are recorded as
    /// missing fields, not errors.
    pub(crate) fn from_input(input: &Input) -> Self {
        let mut entries = Vec::with_capacity(input.streams().count());

        for stream in input.streams() {
            let index = stream.index();
            let parameters = stream.parameters();
            let kind = StreamKind::from_media_type(parameters.medium());

            let codec = match kind {
                StreamKind::Video => ffmpeg_next::decoder::find(parameters.id()),
                _ => None,
            };

            let average_frame_rate = {
                let avg = rate_to_f64(stream.avg_frame_rate());
                if avg > 0.0 { avg } else { rate_to_f64(stream.rate()) }
            };

            let mut info = StreamInfo {
                index,
                kind,
                decoder_name: codec.map(|c| c.name().to_string()),
                average_frame_rate,
                start_time: timestamp_or_none(stream.start_time()),
                duration: timestamp_or_none(stream.duration()),
                bit_rate: None,
                resolution: None,
            };

            // Probe resolution and bit rate through a throwaway decoder.
            if kind == StreamKind::Video
                && let Ok(context) = CodecContext::from_parameters(parameters)
                && let Ok(probe) = context.decoder().video()
            {
                info.resolution = Some((probe.width(), probe.height()));
                let bit_rate = probe.bit_rate();
                if bit_rate > 0 {
                    info.bit_rate = Some(bit_rate);
                }
            }

            entries.push(StreamEntry { kind, codec, info });
        }

        Self { entries }
    }

    /// Number of elementary streams in the container.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry(&self, index: usize) -> Option<&StreamEntry> {
        self.entries.get(index)
    }

    /// Diagnostic snapshots for all streams, in container order.
    pub(crate) fn infos(&self) -> impl Iterator<Item = &StreamInfo> {
        self.entries.iter().map(|entry| &entry.info)
    }

    /// Whether index names a video stream with a resolved decoder.
    pub(crate) fn is_decodable_video(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .is_some_and(|entry| entry.kind == StreamKind::Video && entry.codec.is_some())
    }

    /// The first video stream with a resolved decoder, if any.
    pub(crate) fn first_decodable_video(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.kind == StreamKind::Video && entry.codec.is_some())
    }

    /// Emit one diagnostic log line per stream.
    pub(crate) fn log_streams(&self) {
        for info in self.infos() {
            log::info!("{info}");
        }
    }
}
