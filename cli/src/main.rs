use autocorr_core::{
    compute_linear_autocorrelation, normalize_to_lag_zero, zero_pad, SquareWave,
    DEFAULT_DURATION, DEFAULT_FREQUENCY, DEFAULT_SAMPLE_RATE, NOISE_MAGNITUDE, PADDING_FACTOR,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hound::WavSpec;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "autocorr")]
#[command(about = "Linear autocorrelation of real signals via FFT")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a noisy square wave to a WAV file
    Synth {
        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        #[command(flatten)]
        signal: SignalArgs,
    },

    /// Compute the linear autocorrelation of a WAV file or a synthesized signal
    Analyze {
        /// Input WAV file (mono); synthesizes a square wave when omitted
        #[arg(short, long, value_name = "INPUT.WAV")]
        input: Option<PathBuf>,

        /// Output file for the (seconds, value) series; stdout when omitted
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Emit raw lag values instead of normalizing by lag 0
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        signal: SignalArgs,
    },
}

#[derive(Args)]
struct SignalArgs {
    /// Fundamental frequency in Hz
    #[arg(long, default_value_t = DEFAULT_FREQUENCY)]
    frequency: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f32,

    /// Duration in seconds
    #[arg(long, default_value_t = DEFAULT_DURATION)]
    duration: f32,

    /// Uniform noise magnitude
    #[arg(long, default_value_t = NOISE_MAGNITUDE)]
    noise: f32,

    /// Seed for reproducible noise
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Serialize)]
struct Point {
    seconds: f64,
    value: f32,
}

#[derive(Serialize)]
struct Report {
    sample_rate: f32,
    signal_samples: usize,
    normalized: bool,
    points: Vec<Point>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { output, signal } => synth_command(&output, &signal)?,
        Commands::Analyze { input, output, format, raw, signal } => {
            analyze_command(input.as_deref(), output.as_deref(), format, raw, &signal)?
        }
    }

    Ok(())
}

fn synthesize(signal: &SignalArgs) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let wave = SquareWave::new(signal.frequency, signal.sample_rate, signal.duration)?
        .with_noise(signal.noise)?;

    let samples = match signal.seed {
        Some(seed) => wave.synthesize_with(&mut StdRng::seed_from_u64(seed)),
        None => wave.synthesize(),
    };
    info!(
        "Synthesized {} samples ({} Hz square wave at {} Hz)",
        samples.len(),
        signal.frequency,
        signal.sample_rate
    );
    Ok(samples)
}

fn synth_command(output_path: &Path, signal: &SignalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let samples = synthesize(signal)?;

    let sample_rate = signal.sample_rate.round() as u32;
    if sample_rate == 0 {
        return Err(format!(
            "Sample rate {} Hz rounds to 0 Hz and cannot be stored in a WAV header",
            signal.sample_rate
        )
        .into());
    }
    if sample_rate as f32 != signal.sample_rate {
        warn!("WAV sample rate rounded to {} Hz", sample_rate);
    }

    // 32-bit float keeps the synthesized values exact
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let file = File::create(output_path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!("Wrote {}", output_path.display());
    Ok(())
}

fn read_wav(input_path: &Path) -> Result<(Vec<f32>, f32), Box<dyn std::error::Error>> {
    let file = File::open(input_path)?;
    let mut reader = hound::WavReader::new(file)?;

    let spec = reader.spec();
    info!(
        "Read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );
    if spec.sample_rate == 0 {
        return Err("WAV header has a 0 Hz sample rate".into());
    }
    if spec.channels != 1 {
        return Err(format!("Expected a mono WAV file, got {} channels", spec.channels).into());
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => {
            let int_samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
            int_samples?
                .into_iter()
                .map(|s| s as f32 / 32768.0)
                .collect()
        }
        (hound::SampleFormat::Float, 32) => {
            let float_samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            float_samples?
        }
        (format, bits) => {
            return Err(format!("Unsupported sample format: {:?} {} bits", format, bits).into());
        }
    };

    Ok((samples, spec.sample_rate as f32))
}

fn analyze_command(
    input_path: Option<&Path>,
    output_path: Option<&Path>,
    format: Format,
    raw: bool,
    signal: &SignalArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (samples, sample_rate) = match input_path {
        Some(path) => read_wav(path)?,
        None => (synthesize(signal)?, signal.sample_rate),
    };

    // Pad to a power of two at least twice the signal so no sample is truncated
    let signal_samples = samples.len();
    let padded_len = (signal_samples * PADDING_FACTOR).next_power_of_two();
    let padded = zero_pad(&samples, padded_len);

    let acf = compute_linear_autocorrelation(&padded, padded.len())?;
    let lags = &acf[..signal_samples.min(acf.len())];
    let values = if raw {
        lags.to_vec()
    } else {
        normalize_to_lag_zero(lags)?
    };
    info!("Computed {} lags (transform size {})", values.len(), padded_len);

    let report = Report {
        sample_rate,
        signal_samples,
        normalized: !raw,
        points: time_series(&values, sample_rate),
    };

    let writer: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    match format {
        Format::Csv => write_csv(&mut writer, &report.points)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    if let Some(path) = output_path {
        info!("Wrote {} points to {}", report.points.len(), path.display());
    }
    Ok(())
}

/// Map lag index to seconds: `x = index / sample_rate`
fn time_series(values: &[f32], sample_rate: f32) -> Vec<Point> {
    let sample_rate = sample_rate as f64;
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| Point {
            seconds: index as f64 / sample_rate,
            value,
        })
        .collect()
}

fn write_csv<W: Write>(writer: &mut W, points: &[Point]) -> io::Result<()> {
    writeln!(writer, "seconds,value")?;
    for point in points {
        writeln!(writer, "{},{}", point.seconds, point.value)?;
    }
    Ok(())
}
