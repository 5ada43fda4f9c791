pub mod demo;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use recompose_player::{FrameClock, Player, PlayerConfig, RecordingCanvas, ReplayFailurePolicy};
use recompose_wire::{DecodeOptions, Document, OpcodeRegistry};
use tracing::info;

pub use demo::Demo;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Decode a document file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print the operation listing
    #[arg(short = 'd', long = "disassemble")]
    pub disassemble: bool,

    /// Replay N frames against the recording backend and print its calls
    #[arg(short = 'r', long = "replay", value_name = "N", default_value_t = 0)]
    pub replay: u32,

    /// Wall-clock seconds since midnight for the first frame
    #[arg(long = "time", value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f64,

    /// Seconds between replayed frames
    #[arg(long = "frame-step", value_name = "SECONDS", default_value_t = 1.0)]
    pub frame_step: f64,

    /// Print the variable table and document properties as JSON after replay
    #[arg(long = "variables")]
    pub variables: bool,

    /// Skip unknown sized records instead of failing
    #[arg(long = "lenient")]
    pub lenient: bool,

    /// Keep replaying after a backend failure and report it
    #[arg(long = "continue-on-error")]
    pub continue_on_error: bool,

    /// Write a built-in demo document (use with --output)
    #[arg(long = "write-demo", value_name = "NAME", value_enum)]
    pub write_demo: Option<Demo>,

    /// Destination for --write-demo
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default log filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        if self.lenient {
            DecodeOptions::lenient()
        } else {
            DecodeOptions::strict()
        }
    }

    pub fn player_config(&self) -> PlayerConfig {
        let policy = if self.continue_on_error {
            ReplayFailurePolicy::ContinueAndReport
        } else {
            ReplayFailurePolicy::AbortFrame
        };
        PlayerConfig::default()
            .with_decode_options(self.decode_options())
            .with_failure_policy(policy)
    }

    /// Clock for frame `index`
    pub fn clock(&self, index: u32) -> FrameClock {
        FrameClock::at_time_of_day(self.time).advanced(self.frame_step * f64::from(index))
    }
}

/// Execute the command line, writing results to `out`
pub fn run(args: &Args, out: &mut dyn Write) -> Result<()> {
    if let Some(demo) = args.write_demo {
        let Some(path) = &args.output else {
            bail!("--write-demo needs --output FILE");
        };
        let bytes = demo.build().with_context(|| format!("building demo {demo}"))?;
        fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
        writeln!(out, "wrote {} ({} bytes) to {}", demo, bytes.len(), path.display())?;
        if args.file.is_none() {
            return Ok(());
        }
    }

    let Some(path) = &args.file else {
        bail!("no input: use --file FILE or --write-demo NAME");
    };
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let registry = OpcodeRegistry::standard()?;
    let document = Document::decode_with(&bytes, &registry, &args.decode_options())
        .with_context(|| format!("decoding {}", path.display()))?;
    info!(operations = document.len(), bytes = bytes.len(), "document decoded");

    if args.disassemble {
        writeln!(out, "{} operations", document.len())?;
        write!(out, "{}", document.deep_to_string("  "))?;
    }

    if args.replay == 0 && !args.variables {
        return Ok(());
    }

    let mut player = Player::attach(document, args.player_config())?;
    for index in 0..args.replay {
        let mut canvas = RecordingCanvas::new();
        let report = player
            .frame(&args.clock(index), &mut canvas)
            .with_context(|| format!("replaying frame {index}"))?;
        writeln!(out, "frame {index}:")?;
        for call in canvas.calls() {
            writeln!(out, "  {call}")?;
        }
        for failure in &report.replay.failures {
            writeln!(out, "  ! [{}] {}: {}", failure.index, failure.name, failure.error)?;
        }
        for unresolved in &report.update.unresolved {
            writeln!(
                out,
                "  ? [{}] {}: variable {} unresolved",
                unresolved.operation, unresolved.name, unresolved.variable
            )?;
        }
    }

    if args.variables {
        writeln!(out, "{}", player.snapshot().to_json_pretty()?)?;
    }
    Ok(())
}
