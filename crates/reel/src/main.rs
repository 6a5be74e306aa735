use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use reel_core::{Adapter, AdapterManifest, CueHandlers, CueSpec, Engine, TimelineManager};
use serde_json::json;

/// Cue scheduling engine driven by a simulated media playhead.
#[derive(Parser, Debug)]
#[command(name = "reel")]
#[command(about = "Reel cue scheduler")]
struct Args {
    /// Timeline file to load (optional - if not provided, a built-in demo
    /// timeline is used)
    #[arg(long)]
    timeline: Option<PathBuf>,

    /// Media duration in seconds
    #[arg(long, default_value = "30", value_parser = parse_seconds)]
    duration: f64,

    /// Playhead step per simulated tick, in seconds
    #[arg(long, default_value = "0.5", value_parser = parse_step)]
    step: f64,

    /// Seek targets to jump to after the forward pass, comma separated
    #[arg(long, value_delimiter = ',', value_parser = parse_seconds)]
    seek: Vec<f64>,
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("Invalid time: {}", e))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Time must be a non-negative number, got {}", s));
    }
    Ok(value)
}

/// A zero step would keep the playback loop on the same sample forever.
fn parse_step(s: &str) -> Result<f64, String> {
    let value = parse_seconds(s)?;
    if value == 0.0 {
        return Err("Step must be greater than zero".to_string());
    }
    Ok(value)
}

/// Handlers that print cue activity, used by both demo adapters.
fn announcer_handlers(kind: &'static str) -> CueHandlers {
    CueHandlers::new(
        Arc::new(move |ctx, event| {
            let text = event
                .payload
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or("");
            println!("[{:>6.2}] {} {} on: {}", ctx.time, kind, event.id, text);
        }),
        Arc::new(move |ctx, event| {
            println!("[{:>6.2}] {} {} off", ctx.time, kind, event.id);
        }),
    )
}

fn demo_cues(engine: &mut Engine, player: &str) -> Result<(), anyhow::Error> {
    let cues = [
        ("caption", 1.0, 4.0, "Welcome to Reel"),
        ("caption", 4.0, 8.0, "Cues open and close as time passes"),
        ("marker", 6.0, 6.0, "chapter 2"),
        ("caption", 10.0, 14.0, "Seek backwards to replay a cue"),
        ("marker", 20.0, 20.0, "chapter 3"),
    ];
    for (kind, start, end, text) in cues {
        let spec = CueSpec {
            kind: Some(kind.to_string()),
            payload: json!({ "text": text }),
            ..CueSpec::between(start, end)
        };
        engine
            .register_cue(player, spec)
            .map_err(anyhow::Error::msg)?;
    }
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = Args::parse();

    let mut engine = Engine::new();
    engine
        .register_adapter(
            "caption",
            Adapter::new(
                AdapterManifest::named("caption").with_description("Prints timed caption text"),
                announcer_handlers("caption"),
            ),
        )
        .map_err(anyhow::Error::msg)?;
    engine
        .register_adapter(
            "marker",
            Adapter::new(
                AdapterManifest::named("marker").with_description("Announces chapter markers"),
                announcer_handlers("marker"),
            ),
        )
        .map_err(anyhow::Error::msg)?;

    let player = engine.create_player(Some("demo"), Some(args.duration));

    match &args.timeline {
        Some(path) => {
            let mut manager = TimelineManager::new()?;
            let timeline = manager.load(path)?;
            println!("Loaded timeline '{}' from {}", timeline.name, path.display());
            let registered = manager.apply_to_player(&mut engine, &player)?;
            println!("Registered {} cues", registered);
        }
        None => {
            println!("No timeline given, using the built-in demo");
            demo_cues(&mut engine, &player)?;
        }
    }

    println!("Adapters: {}", engine.adapters().kinds().join(", "));
    println!(
        "Playing {} cues over {}s in {}s steps",
        engine.cues(&player).len(),
        args.duration,
        args.step
    );

    let mut time = 0.0;
    while time < args.duration {
        time = (time + args.step).min(args.duration);
        engine.on_time_update(&player, time);
    }

    for target in &args.seek {
        println!("Seeking to {:.2}s", target);
        engine.on_time_update(&player, *target);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_rejects_bad_input() {
        assert_eq!(parse_seconds("4.5"), Ok(4.5));
        assert_eq!(parse_seconds("0"), Ok(0.0));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("NaN").is_err());
        assert!(parse_seconds("later").is_err());
    }

    #[test]
    fn test_parse_step_rejects_zero() {
        assert_eq!(parse_step("0.5"), Ok(0.5));
        assert!(parse_step("0").is_err());
        assert!(parse_step("-0.5").is_err());
    }
}
