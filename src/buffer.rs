//! Owned pixel buffers.
//!
//! [`FrameBuffer`] is the raw, tightly-packed HWC pixel buffer that frame
//! retrieval writes into. Callers either let the reader allocate one or
//! supply their own (the byte layout must then exactly match the requested
//! [`OutputFormat`](crate::OutputFormat)).

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

use crate::format::{ElementType, OutputFormat};

/// A tightly-packed pixel buffer in HWC (height, width, channel) layout.
///
/// Rows are contiguous with no padding: the byte size is always
/// `height * width * channels * element.byte_width()`. Multi-byte samples are
/// stored in native endianness, so a `Uint16` buffer can be reinterpreted as
/// `u16` samples directly.
#[derive(Debug, Clone)]
#[must_use]
pub struct FrameBuffer {
    data: Vec<u8>,
    height: u32,
    width: u32,
    channels: u32,
    element: ElementType,
}

impl FrameBuffer {
    /// Allocate a zero-filled buffer with the given shape and element type.
    pub fn new(height: u32, width: u32, channels: u32, element: ElementType) -> Self {
        let len =
            height as usize * width as usize * channels as usize * element.byte_width();
        Self {
            data: vec![0; len],
            height,
            width,
            channels,
            element,
        }
    }

    /// Allocate a zero-filled buffer shaped for the given output format.
    pub fn for_format(format: &OutputFormat) -> Self {
        Self::new(
            format.height(),
            format.width(),
            format.channels(),
            format.element(),
        )
    }

    /// Buffer height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Buffer width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of channels per pixel.
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Element type of the stored samples.
    pub fn element(&self) -> ElementType {
        self.element
    }

    /// Shape as `(height, width, channels)`.
    pub fn shape(&self) -> (u32, u32, u32) {
        (self.height, self.width, self.channels)
    }

    /// Total byte size of the buffer.
    pub fn len_bytes(&self) -> usize {
        self.data.len()
    }

    /// Raw bytes of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes of the buffer.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its backing bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Restamp the shape metadata after a conversion wrote into this buffer.
    ///
    /// The byte length must already match the format; the materializer checks
    /// that before writing.
    pub(crate) fn set_shape(&mut self, format: &OutputFormat) {
        debug_assert_eq!(self.data.len(), format.len_bytes());
        self.height = format.height();
        self.width = format.width();
        self.channels = format.channels();
        self.element = format.element();
    }

    /// Decode the 16-bit samples of this buffer into a `u16` vector.
    fn samples_u16(&self) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
            .collect()
    }

    /// View the buffer as an [`image::DynamicImage`], for saving or debugging.
    ///
    /// Returns `None` for [`ElementType::Float16`] buffers — their samples are
    /// raw 16-bit storage awaiting caller reinterpretation, so rendering them
    /// as integer luminance would be misleading.
    pub fn to_image(&self) -> Option<DynamicImage> {
        let (width, height) = (self.width, self.height);
        match (self.element, self.channels) {
            (ElementType::Uint8, 3) => RgbImage::from_raw(width, height, self.data.clone())
                .map(DynamicImage::ImageRgb8),
            (ElementType::Uint8, 1) => GrayImage::from_raw(width, height, self.data.clone())
                .map(DynamicImage::ImageLuma8),
            (ElementType::Uint16, 3) => {
                ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(width, height, self.samples_u16())
                    .map(DynamicImage::ImageRgb16)
            }
            (ElementType::Uint16, 1) => {
                ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, self.samples_u16())
                    .map(DynamicImage::ImageLuma16)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Interpolation;

    #[test]
    fn allocation_matches_format_layout() {
        let format =
            OutputFormat::new(32, 48, 3, ElementType::Uint16, Interpolation::Bilinear).unwrap();
        let buffer = FrameBuffer::for_format(&format);

        assert_eq!(buffer.shape(), (32, 48, 3));
        assert_eq!(buffer.len_bytes(), 32 * 48 * 3 * 2);
        assert_eq!(buffer.len_bytes(), format.len_bytes());
    }

    #[test]
    fn uint8_rgb_buffer_converts_to_image() {
        let buffer = FrameBuffer::new(4, 4, 3, ElementType::Uint8);
        let image = buffer.to_image().expect("rgb8 buffer should convert");
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
    }

    #[test]
    fn float16_buffer_has_no_image_view() {
        let buffer = FrameBuffer::new(4, 4, 1, ElementType::Float16);
        assert!(buffer.to_image().is_none());
    }
}
