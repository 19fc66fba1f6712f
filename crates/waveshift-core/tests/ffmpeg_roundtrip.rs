//! Conversion properties that need a real ffmpeg binary.
//!
//! Run with `cargo test -- --ignored` on a machine with ffmpeg installed.

use std::path::Path;
use std::time::Duration;
use waveshift_core::{AudioFormat, Transcoder};

const SAMPLE_RATE: u32 = 8000;

/// Minimal mono 16-bit PCM WAV: one second of a 440 Hz square wave.
fn wav_fixture() -> Vec<u8> {
    let samples: Vec<i16> = (0..SAMPLE_RATE)
        .map(|i| {
            if (i * 440 / SAMPLE_RATE) % 2 == 0 {
                8000
            } else {
                -8000
            }
        })
        .collect();
    let data_len = (samples.len() * 2) as u32;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

fn transcoder() -> Transcoder {
    Transcoder::new("ffmpeg", Duration::from_secs(60))
}

/// Decoding the file proves container/codec validity; lossy content is fine.
async fn assert_decodable(path: &Path) {
    let status = tokio::process::Command::new("ffmpeg")
        .arg("-v")
        .arg("error")
        .arg("-i")
        .arg(path)
        .arg("-f")
        .arg("null")
        .arg("-")
        .status()
        .await
        .expect("ffmpeg must be installed for ignored tests");
    assert!(status.success(), "{} is not decodable", path.display());
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn roundtrip_yields_decodable_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("tone.wav");
    std::fs::write(&source, wav_fixture()).unwrap();

    let transcoder = transcoder();
    let mp3 = transcoder.convert(&source, AudioFormat::Mp3).await.unwrap();
    assert_decodable(&mp3).await;

    let back = transcoder.convert(&mp3, AudioFormat::Wav).await.unwrap();
    assert_decodable(&back).await;
    assert!(std::fs::metadata(&back).unwrap().len() > 0);
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn converting_twice_yields_two_valid_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("tone.wav");
    std::fs::write(&source, wav_fixture()).unwrap();

    let transcoder = transcoder();
    let first = transcoder.convert(&source, AudioFormat::Opus).await.unwrap();
    let renamed = dir.path().join("first.opus");
    std::fs::rename(&first, &renamed).unwrap();

    let second = transcoder.convert(&source, AudioFormat::Opus).await.unwrap();

    assert_decodable(&renamed).await;
    assert_decodable(&second).await;
    // source untouched by either run
    assert_eq!(std::fs::read(&source).unwrap(), wav_fixture());
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn every_catalog_target_encodes() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("tone.wav");
    std::fs::write(&source, wav_fixture()).unwrap();

    let transcoder = transcoder();
    for target in [AudioFormat::Mp3, AudioFormat::Opus, AudioFormat::Aac] {
        let output = transcoder.convert(&source, target).await.unwrap();
        assert_decodable(&output).await;
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn garbage_input_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("noise.mp3");
    std::fs::write(&source, b"definitely not an audio container").unwrap();

    let err = transcoder()
        .convert(&source, AudioFormat::Wav)
        .await
        .unwrap_err();
    assert!(matches!(err, waveshift_core::Error::Decode(_)), "{err}");
}
