//! Reader integration tests.
//!
//! Most of these require the fixture files produced by
//! `tests/fixtures/generate_fixtures.sh` and are skipped when the fixtures
//! are absent, matching how CI environments without FFmpeg tooling run the
//! suite.

use std::path::Path;

use framefeed::{ElementType, FrameBuffer, FrameFeedError, OutputFormat, VideoReader};

/// 10 frames, 128x128, yuv420p, single video stream.
const SAMPLE_10_FRAMES: &str = "tests/fixtures/sample_10_frames.mp4";
const SAMPLE_FRAME_COUNT: u64 = 10;

fn fixture_available() -> bool {
    Path::new(SAMPLE_10_FRAMES).exists()
}

#[test]
fn open_nonexistent_file() {
    let result = VideoReader::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = VideoReader::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn frame_count_and_idempotent_end_of_stream() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let mut produced = 0u64;
    while reader.next_frame(None).expect("decode failure").is_some() {
        produced += 1;
    }
    assert_eq!(produced, SAMPLE_FRAME_COUNT);

    // End of stream must be repeatable, not an error.
    assert!(reader.next_frame(None).expect("post-EOS call").is_none());
    assert!(reader.next_frame(None).expect("post-EOS call").is_none());
}

#[test]
fn scaled_extraction_scenario() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    reader.select_stream(None).expect("auto-select sole video stream");

    let format = OutputFormat::rgb8(64, 64).unwrap();
    for _ in 0..SAMPLE_FRAME_COUNT {
        let frame = reader
            .next_frame(Some(&format))
            .expect("decode failure")
            .expect("frame expected before end of stream");
        assert_eq!(frame.shape(), (64, 64, 3));
        assert_eq!(frame.element(), ElementType::Uint8);
        assert_eq!(frame.len_bytes(), 64 * 64 * 3);
    }
    assert!(reader.next_frame(Some(&format)).expect("11th call").is_none());
}

#[test]
fn default_allocation_uses_native_geometry() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let (native_height, native_width) = reader.native_size();

    let frame = reader
        .next_frame(None)
        .expect("decode failure")
        .expect("fixture has frames");
    let (height, width, channels) = frame.shape();
    assert_eq!((height, width), (native_height, native_width));
    assert_eq!(channels, 3, "yuv420p implies 3-channel output");
    assert_eq!(frame.element(), ElementType::Uint8);
}

#[test]
fn mismatched_buffer_fails_without_losing_a_frame() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let format = OutputFormat::rgb8(64, 64).unwrap();

    let mut wrong = FrameBuffer::new(32, 32, 3, ElementType::Uint8);
    let sentinel = wrong.as_bytes().to_vec();
    let error = reader
        .next_frame_into(&format, &mut wrong)
        .expect_err("mismatched buffer must fail");
    assert!(matches!(error, FrameFeedError::ShapeMismatch { .. }));
    assert_eq!(wrong.as_bytes(), sentinel.as_slice(), "no partial write");

    // The failed call consumed nothing: all frames are still available.
    let mut buffer = FrameBuffer::for_format(&format);
    let mut produced = 0u64;
    while reader
        .next_frame_into(&format, &mut buffer)
        .expect("decode failure")
    {
        produced += 1;
    }
    assert_eq!(produced, SAMPLE_FRAME_COUNT);
}

#[test]
fn reused_buffer_sees_every_frame() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let format = OutputFormat::gray8(48, 48).unwrap();
    let mut buffer = FrameBuffer::for_format(&format);

    let mut produced = 0u64;
    while reader
        .next_frame_into(&format, &mut buffer)
        .expect("decode failure")
    {
        assert_eq!(buffer.shape(), (48, 48, 1));
        produced += 1;
    }
    assert_eq!(produced, SAMPLE_FRAME_COUNT);
    assert!(!reader
        .next_frame_into(&format, &mut buffer)
        .expect("post-EOS call"));
}

#[test]
fn alternating_formats_share_one_reader() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let small = OutputFormat::rgb8(32, 32).unwrap();
    let large = OutputFormat::rgb8(96, 96).unwrap();

    // Alternating descriptors exercises both converter-cache misses and hits.
    for round in 0..(SAMPLE_FRAME_COUNT / 2) {
        let first = reader
            .next_frame(Some(&small))
            .expect("decode failure")
            .unwrap_or_else(|| panic!("frame missing in round {round}"));
        assert_eq!(first.shape(), (32, 32, 3));

        let second = reader
            .next_frame(Some(&large))
            .expect("decode failure")
            .unwrap_or_else(|| panic!("frame missing in round {round}"));
        assert_eq!(second.shape(), (96, 96, 3));
    }
    assert!(reader.next_frame(Some(&small)).expect("EOS").is_none());
}

#[test]
fn sixteen_bit_output_has_expected_layout() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let format = OutputFormat::new(
        40,
        40,
        1,
        ElementType::Uint16,
        framefeed::Interpolation::Bilinear,
    )
    .unwrap();

    let frame = reader
        .next_frame(Some(&format))
        .expect("decode failure")
        .expect("fixture has frames");
    assert_eq!(frame.len_bytes(), 40 * 40 * 2);
    assert_eq!(frame.element(), ElementType::Uint16);
}

#[test]
fn selecting_a_bogus_stream_index_fails() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let stream_count = reader.stream_count();

    let error = reader
        .select_stream(Some(stream_count + 7))
        .expect_err("out-of-range index must fail");
    assert!(matches!(error, FrameFeedError::StreamNotDecodable { .. }));

    // The reader stays usable after a failed selection.
    assert!(reader.next_frame(None).expect("decode failure").is_some());
}

#[test]
fn stream_table_reports_video_diagnostics() {
    if !fixture_available() {
        return;
    }

    let reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    assert_eq!(reader.query_streams(), reader.stream_count());
    assert!(reader.stream_count() >= 1);

    let active = reader
        .stream_info(reader.active_stream_index())
        .expect("active stream has an info entry");
    assert_eq!(active.kind, framefeed::StreamKind::Video);
    assert_eq!(active.resolution, Some((128, 128)));
    assert!(active.decoder_name.is_some());
}

#[test]
fn reselecting_the_stream_resets_decoding() {
    if !fixture_available() {
        return;
    }

    let mut reader = VideoReader::open(SAMPLE_10_FRAMES).expect("Failed to open fixture");
    let index = reader.active_stream_index();
    let format = OutputFormat::rgb8(64, 64).unwrap();

    // Consume a few frames, then install a fresh decoder for the same stream.
    for _ in 0..3 {
        assert!(reader.next_frame(Some(&format)).expect("decode").is_some());
    }
    reader
        .select_stream(Some(index))
        .expect("reselecting the active stream");

    // Decoding continues from the current container position with the new
    // decoder and a rebuilt converter cache.
    let mut remaining = 0u64;
    while reader.next_frame(Some(&format)).expect("decode").is_some() {
        remaining += 1;
    }
    assert!(remaining > 0, "packets after the reselect point should decode");
}
