use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn tmp_path(name: &str) -> PathBuf {
    let tmp_dir = PathBuf::from("tmp");
    fs::create_dir_all(&tmp_dir).ok();
    tmp_dir.join(name)
}

fn run_autocorr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_autocorr"))
        .args(args)
        .output()
        .expect("Failed to execute autocorr")
}

fn parse_csv(text: &str) -> Vec<(f64, f32)> {
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("seconds,value"));
    lines
        .map(|line| {
            let (x, y) = line.split_once(',').expect("Malformed CSV row");
            (x.parse().expect("Bad seconds"), y.parse().expect("Bad value"))
        })
        .collect()
}

#[test]
fn test_synth_writes_float_wav() {
    let output = tmp_path("test_synth.wav");

    let result = run_autocorr(&["synth", output.to_str().unwrap(), "--seed", "1"]);
    assert!(result.status.success(), "synth failed: {}", String::from_utf8_lossy(&result.stderr));

    let reader = hound::WavReader::open(&output).expect("Output WAV not readable");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 1024);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(reader.len(), 1024);
}

#[test]
fn test_analyze_synthesized_signal_csv() {
    let result = run_autocorr(&["analyze", "--seed", "3"]);
    assert!(result.status.success(), "analyze failed: {}", String::from_utf8_lossy(&result.stderr));

    let points = parse_csv(&String::from_utf8_lossy(&result.stdout));
    assert_eq!(points.len(), 1024);
    assert_eq!(points[0], (0.0, 1.0));
    assert!((points[512].0 - 0.5).abs() < 1e-9);
    assert!(points.iter().skip(1).all(|&(_, v)| v < 1.0));
}

#[test]
fn test_analyze_wav_round_trip_json() {
    let wav = tmp_path("test_analyze_input.wav");
    let json = tmp_path("test_analyze_output.json");

    let result = run_autocorr(&[
        "synth",
        wav.to_str().unwrap(),
        "--frequency",
        "8",
        "--duration",
        "0.5",
        "--seed",
        "9",
    ]);
    assert!(result.status.success());

    let result = run_autocorr(&[
        "analyze",
        "--input",
        wav.to_str().unwrap(),
        "--output",
        json.to_str().unwrap(),
        "--format",
        "json",
        "--raw",
    ]);
    assert!(result.status.success(), "analyze failed: {}", String::from_utf8_lossy(&result.stderr));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).expect("JSON output not written")).unwrap();
    assert_eq!(report["sample_rate"], 1024.0);
    assert_eq!(report["signal_samples"], 512);
    assert_eq!(report["normalized"], false);

    let points = report["points"].as_array().unwrap();
    assert_eq!(points.len(), 512);
    let lag_zero = points[0]["value"].as_f64().unwrap();
    assert!(lag_zero > 1.0, "Raw lag 0 should be the signal energy, got {}", lag_zero);
}

#[test]
fn test_analyze_rejects_invalid_sample_rate() {
    let result = run_autocorr(&["analyze", "--sample-rate", "0"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("sample rate"));
}

fn write_int_wav(path: &PathBuf, channels: u16, bits_per_sample: u16, samples: &[i32]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 1000,
        bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for &sample in samples {
        match bits_per_sample {
            8 => writer.write_sample(sample as i8).unwrap(),
            _ => writer.write_sample(sample as i16).unwrap(),
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_analyze_16_bit_wav() {
    let wav = tmp_path("test_analyze_16bit.wav");
    let samples: Vec<i16> = (0..256)
        .map(|i| ((i as f32 * 2.0 * std::f32::consts::PI * 8.0 / 1000.0).sin() * 16384.0) as i16)
        .collect();
    let as_i32: Vec<i32> = samples.iter().map(|&s| s as i32).collect();
    write_int_wav(&wav, 1, 16, &as_i32);

    let result = run_autocorr(&["analyze", "--input", wav.to_str().unwrap(), "--raw"]);
    assert!(result.status.success(), "analyze failed: {}", String::from_utf8_lossy(&result.stderr));

    let points = parse_csv(&String::from_utf8_lossy(&result.stdout));
    assert_eq!(points.len(), 256);
    assert!((points[1].0 - 0.001).abs() < 1e-9, "Expected 1 ms per lag at 1000 Hz");

    let energy: f32 = samples.iter().map(|&s| (s as f32 / 32768.0).powi(2)).sum();
    let lag_zero = points[0].1;
    assert!(
        (lag_zero - energy).abs() / energy < 1e-3,
        "Lag 0 {} should equal the energy of the scaled samples {}",
        lag_zero,
        energy
    );
}

#[test]
fn test_analyze_rejects_unsupported_wav_layouts() {
    let samples: Vec<i32> = (0..64).map(|i| (i % 16) - 8).collect();

    let eight_bit = tmp_path("test_analyze_8bit.wav");
    write_int_wav(&eight_bit, 1, 8, &samples);
    let result = run_autocorr(&["analyze", "--input", eight_bit.to_str().unwrap()]);
    assert!(!result.status.success(), "8-bit WAV should be rejected");
    assert!(String::from_utf8_lossy(&result.stderr).contains("Unsupported sample format"));

    let stereo = tmp_path("test_analyze_stereo.wav");
    write_int_wav(&stereo, 2, 16, &samples);
    let result = run_autocorr(&["analyze", "--input", stereo.to_str().unwrap()]);
    assert!(!result.status.success(), "Stereo WAV should be rejected");
    assert!(String::from_utf8_lossy(&result.stderr).contains("mono"));
}

#[test]
fn test_synth_rejects_sample_rate_rounding_to_zero() {
    let output = tmp_path("test_synth_zero_rate.wav");
    fs::remove_file(&output).ok();

    let result = run_autocorr(&[
        "synth",
        output.to_str().unwrap(),
        "--sample-rate",
        "0.4",
        "--duration",
        "10",
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("0 Hz"));
    assert!(!output.exists(), "No WAV should be written for a 0 Hz header");
}
