//! Converter cache and frame materialization.
//!
//! Converting a decoded frame to a requested output format needs an swscale
//! context parameterized by both the source geometry (the active decoder's
//! native width, height, and pixel format) and the destination described by
//! an [`OutputFormat`]. Building one is not free, so the reader keeps a
//! [`ConverterCache`]: at most one converter per distinct descriptor, all
//! bound to the current native geometry. Reselecting the active stream
//! replaces the whole cache, since every entry would otherwise be bound to
//! stale source parameters.

use std::collections::{HashMap, hash_map::Entry};

use ffmpeg_next::{
    format::Pixel, frame::Video as VideoFrame, software::scaling::Context as ScalingContext,
};

use crate::{buffer::FrameBuffer, error::FrameFeedError, format::OutputFormat};

/// Session-owned cache of colorspace/scale converters.
///
/// Keys are [`OutputFormat`] values; every cached converter maps the native
/// geometry this cache was created with to its key's geometry and pixel
/// format.
pub(crate) struct ConverterCache {
    native_width: u32,
    native_height: u32,
    native_format: Pixel,
    converters: HashMap<OutputFormat, ScalingContext>,
}

impl ConverterCache {
    /// Create an empty cache bound to the given native geometry.
    pub(crate) fn new(native_width: u32, native_height: u32, native_format: Pixel) -> Self {
        Self {
            native_width,
            native_height,
            native_format,
            converters: HashMap::new(),
        }
    }

    /// Fetch the converter for `format`, constructing it on first use.
    ///
    /// A cache hit returns the existing converter unchanged.
    pub(crate) fn get(
        &mut self,
        format: &OutputFormat,
    ) -> Result<&mut ScalingContext, FrameFeedError> {
        match self.converters.entry(format.clone()) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                log::debug!(
                    "Building converter: {}x{} {:?} -> {format} {:?}",
                    self.native_width,
                    self.native_height,
                    self.native_format,
                    format.pixel_format(),
                );
                let converter = ScalingContext::get(
                    self.native_format,
                    self.native_width,
                    self.native_height,
                    format.pixel_format(),
                    format.width(),
                    format.height(),
                    format.interpolation().to_scaling_flags(),
                )
                .map_err(|error| FrameFeedError::ConverterSetup {
                    src: format!(
                        "{}x{} {:?}",
                        self.native_width, self.native_height, self.native_format,
                    ),
                    target: format!("{format} {:?}", format.pixel_format()),
                    reason: error.to_string(),
                })?;
                Ok(slot.insert(converter))
            }
        }
    }

    /// Number of converters currently cached.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.converters.len()
    }
}

/// Verify a buffer's byte layout matches the requested output format.
pub(crate) fn ensure_layout(
    format: &OutputFormat,
    buffer: &FrameBuffer,
) -> Result<(), FrameFeedError> {
    let expected = format.len_bytes();
    if buffer.len_bytes() != expected {
        return Err(FrameFeedError::ShapeMismatch {
            expected,
            expected_shape: format.to_string(),
            actual: buffer.len_bytes(),
        });
    }
    Ok(())
}

/// Convert a decoded frame into the output buffer.
///
/// Runs `converter` over `source` into the reusable `scratch` frame, then
/// copies the pixel rows tightly packed into `buffer` and restamps its shape.
/// The layout check happens before any write.
pub(crate) fn materialize(
    converter: &mut ScalingContext,
    source: &VideoFrame,
    format: &OutputFormat,
    scratch: &mut VideoFrame,
    buffer: &mut FrameBuffer,
) -> Result<(), FrameFeedError> {
    ensure_layout(format, buffer)?;
    converter
        .run(source, scratch)
        .map_err(|error| FrameFeedError::Decode(error.to_string()))?;
    copy_packed_rows(scratch, format, buffer);
    buffer.set_shape(format);
    Ok(())
}

/// Copy plane 0 of `frame` into `buffer`, dropping any stride padding.
fn copy_packed_rows(frame: &VideoFrame, format: &OutputFormat, buffer: &mut FrameBuffer) {
    let row_bytes =
        format.width() as usize * format.channels() as usize * format.element().byte_width();
    let height = format.height() as usize;
    let stride = frame.stride(0);
    let data = frame.data(0);
    let out = buffer.as_bytes_mut();

    if stride == row_bytes {
        out.copy_from_slice(&data[..row_bytes * height]);
    } else {
        for row in 0..height {
            let src_start = row * stride;
            out[row * row_bytes..(row + 1) * row_bytes]
                .copy_from_slice(&data[src_start..src_start + row_bytes]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ElementType, Interpolation};

    fn cache_128() -> ConverterCache {
        ffmpeg_next::init().expect("ffmpeg init");
        ConverterCache::new(128, 128, Pixel::YUV420P)
    }

    #[test]
    fn equal_descriptors_share_one_converter() {
        let mut cache = cache_128();
        let first = OutputFormat::rgb8(64, 64).unwrap();
        let second = first.clone();

        cache.get(&first).expect("first build");
        cache.get(&second).expect("cache hit");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_descriptors_get_distinct_converters() {
        let mut cache = cache_128();
        let rgb = OutputFormat::rgb8(64, 64).unwrap();
        let gray =
            OutputFormat::new(32, 32, 1, ElementType::Uint16, Interpolation::Nearest).unwrap();

        cache.get(&rgb).expect("rgb converter");
        cache.get(&gray).expect("gray converter");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn materialize_fills_correctly_shaped_buffers() {
        let mut cache = cache_128();
        let source = VideoFrame::new(Pixel::YUV420P, 128, 128);
        let mut scratch = VideoFrame::empty();

        for format in [
            OutputFormat::rgb8(64, 64).unwrap(),
            OutputFormat::new(32, 48, 1, ElementType::Uint16, Interpolation::Bilinear).unwrap(),
        ] {
            let mut buffer = FrameBuffer::for_format(&format);
            let converter = cache.get(&format).expect("converter");
            materialize(converter, &source, &format, &mut scratch, &mut buffer)
                .expect("materialize");
            assert_eq!(buffer.shape(), (format.height(), format.width(), format.channels()));
            assert_eq!(buffer.len_bytes(), format.len_bytes());
        }
    }

    #[test]
    fn mismatched_buffer_is_rejected_before_any_write() {
        let mut cache = cache_128();
        let format = OutputFormat::rgb8(64, 64).unwrap();
        let mut wrong = FrameBuffer::new(32, 32, 3, ElementType::Uint8);
        let sentinel = wrong.as_bytes().to_vec();

        let source = VideoFrame::new(Pixel::YUV420P, 128, 128);
        let mut scratch = VideoFrame::empty();
        let converter = cache.get(&format).expect("converter");

        let error = materialize(converter, &source, &format, &mut scratch, &mut wrong)
            .expect_err("layout mismatch");
        assert!(matches!(error, FrameFeedError::ShapeMismatch { .. }));
        assert_eq!(wrong.as_bytes(), sentinel.as_slice());
    }
}
