use brickwall::wav::{read_wav, write_wav};
use brickwall::{Limiter, LimiterConfig};
use std::error::Error;

/// Limits a wav file and writes the result in the input's sample format.
///
/// Usage: `limit_wav <input.wav> <output.wav> [threshold] [attack_ms] [release_ms]`
///
/// Defaults are a 0.5 threshold, 5 ms attack and 50 ms release.
fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("usage: limit_wav <input.wav> <output.wav> [threshold] [attack_ms] [release_ms]");
        std::process::exit(2);
    };
    let threshold: f32 = args.next().map(|a| a.parse::<f32>()).transpose()?.unwrap_or(0.5);
    let attack_ms: f32 = args.next().map(|a| a.parse::<f32>()).transpose()?.unwrap_or(5.0);
    let release_ms: f32 = args.next().map(|a| a.parse::<f32>()).transpose()?.unwrap_or(50.0);

    let config = LimiterConfig::from_millis(threshold, attack_ms, release_ms)?;
    let audio = read_wav(&input)?;
    let limiter = Limiter::new(config, audio.buffer.sample_rate())?;
    let limited = limiter.process(&audio.buffer)?;

    for warning in &limited.warnings {
        println!(
            "got out of bounds input value: {} at frame {} channel {}",
            warning.value, warning.frame, warning.channel
        );
    }

    println!(
        "Limiting {input} ({} channels, {} Hz, {:.2?}) into {output}",
        audio.buffer.channels(),
        audio.buffer.sample_rate(),
        audio.buffer.duration()
    );
    write_wav(&output, &limited.buffer, audio.format)?;

    Ok(())
}
