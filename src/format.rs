//! Output format descriptors.
//!
//! [`OutputFormat`] describes the shape a decoded frame should be delivered
//! in: height, width, channel count, element type, and the resampling
//! algorithm used to get there. The matching FFmpeg pixel format is derived,
//! never chosen by the caller, so the descriptor can only represent layouts
//! the conversion stage actually supports.
//!
//! Descriptors are immutable values with full value equality and hashing —
//! the converter cache uses them directly as map keys.

use std::fmt::{Display, Formatter, Result as FmtResult};

use ffmpeg_next::{format::Pixel, software::scaling::Flags as ScalingFlags};

use crate::error::FrameFeedError;

/// Element type of the output pixel buffer.
///
/// Controls the byte width of each sample and, together with the channel
/// count, the derived FFmpeg pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementType {
    /// 8-bit unsigned samples. This is the default.
    #[default]
    Uint8,
    /// 16-bit unsigned samples (native endian).
    Uint16,
    /// Half-precision float output, approximated by 16-bit storage.
    ///
    /// FFmpeg has no native float pixel formats, so the conversion stage
    /// produces 16-bit unsigned samples and leaves reinterpretation to the
    /// caller. This is a lossy convenience, not a numeric cast.
    Float16,
}

impl ElementType {
    /// Byte width of one sample of this type.
    pub fn byte_width(self) -> usize {
        match self {
            ElementType::Uint8 => 1,
            ElementType::Uint16 | ElementType::Float16 => 2,
        }
    }
}

/// Resampling algorithm used when scaling to the output resolution.
///
/// Maps 1:1 onto the swscale algorithm flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Nearest-neighbour sampling.
    Nearest,
    /// Fast bilinear approximation.
    FastBilinear,
    /// Bilinear filtering. This is the default.
    #[default]
    Bilinear,
    /// Bicubic filtering.
    Bicubic,
    /// Area averaging.
    Area,
    /// Lanczos windowed sinc.
    Lanczos,
}

impl Interpolation {
    pub(crate) fn to_scaling_flags(self) -> ScalingFlags {
        match self {
            Interpolation::Nearest => ScalingFlags::POINT,
            Interpolation::FastBilinear => ScalingFlags::FAST_BILINEAR,
            Interpolation::Bilinear => ScalingFlags::BILINEAR,
            Interpolation::Bicubic => ScalingFlags::BICUBIC,
            Interpolation::Area => ScalingFlags::AREA,
            Interpolation::Lanczos => ScalingFlags::LANCZOS,
        }
    }
}

// 16-bit output uses the native-endian variants so callers can reinterpret
// the buffer as `u16` samples directly.
#[cfg(target_endian = "little")]
const RGB48: Pixel = Pixel::RGB48LE;
#[cfg(target_endian = "big")]
const RGB48: Pixel = Pixel::RGB48BE;
#[cfg(target_endian = "little")]
const GRAY16: Pixel = Pixel::GRAY16LE;
#[cfg(target_endian = "big")]
const GRAY16: Pixel = Pixel::GRAY16BE;

/// Describes the desired shape of a delivered frame.
///
/// Construction validates the channel count and dimensions; a successfully
/// constructed descriptor always corresponds to a supported conversion
/// target. The descriptor is immutable and compares by value, which makes it
/// usable as the converter-cache key.
///
/// # Example
///
/// ```
/// use framefeed::{ElementType, Interpolation, OutputFormat};
///
/// let format = OutputFormat::new(64, 64, 3, ElementType::Uint8, Interpolation::Bilinear)?;
/// assert_eq!(format.len_bytes(), 64 * 64 * 3);
/// # Ok::<(), framefeed::FrameFeedError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct OutputFormat {
    height: u32,
    width: u32,
    channels: u32,
    element: ElementType,
    interpolation: Interpolation,
}

impl OutputFormat {
    /// Create a new output format descriptor.
    ///
    /// # Errors
    ///
    /// - [`FrameFeedError::InvalidChannelCount`] if `channels` is neither 1
    ///   nor 3.
    /// - [`FrameFeedError::ZeroDimension`] if `height` or `width` is zero.
    pub fn new(
        height: u32,
        width: u32,
        channels: u32,
        element: ElementType,
        interpolation: Interpolation,
    ) -> Result<Self, FrameFeedError> {
        if channels != 1 && channels != 3 {
            return Err(FrameFeedError::InvalidChannelCount { channels });
        }
        if height == 0 || width == 0 {
            return Err(FrameFeedError::ZeroDimension { height, width });
        }

        Ok(Self {
            height,
            width,
            channels,
            element,
            interpolation,
        })
    }

    /// Shorthand for 3-channel 8-bit RGB output with bilinear resampling.
    pub fn rgb8(height: u32, width: u32) -> Result<Self, FrameFeedError> {
        Self::new(
            height,
            width,
            3,
            ElementType::Uint8,
            Interpolation::Bilinear,
        )
    }

    /// Shorthand for 1-channel 8-bit grayscale output with bilinear resampling.
    pub fn gray8(height: u32, width: u32) -> Result<Self, FrameFeedError> {
        Self::new(
            height,
            width,
            1,
            ElementType::Uint8,
            Interpolation::Bilinear,
        )
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output channel count (1 or 3).
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Output element type.
    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Resampling algorithm.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Total byte size of a tightly-packed buffer in this format.
    pub fn len_bytes(&self) -> usize {
        self.height as usize * self.width as usize * self.channels as usize
            * self.element.byte_width()
    }

    /// The FFmpeg pixel format this descriptor converts into.
    ///
    /// Pure function of (element type, channel count):
    ///
    /// | element            | 3 channels | 1 channel |
    /// |--------------------|------------|-----------|
    /// | `Uint8`            | RGB24      | GRAY8     |
    /// | `Uint16`/`Float16` | RGB48      | GRAY16    |
    pub fn pixel_format(&self) -> Pixel {
        match (self.element, self.channels) {
            (ElementType::Uint8, 3) => Pixel::RGB24,
            (ElementType::Uint8, _) => Pixel::GRAY8,
            (_, 3) => RGB48,
            (_, _) => GRAY16,
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}x{}x{} {:?}",
            self.height, self.width, self.channels, self.element,
        )
    }
}
