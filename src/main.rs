use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crosscue::{
    assign, parse_cues, read_asr_file, read_caption_file, read_diarization_file, reconcile,
    HumanTranscript, MatchStrategy, ReconcileConfig, ReconciledTranscript, RunMetadata,
};

#[derive(Parser)]
#[command(name = "crosscue")]
#[command(author, version, about = "Meeting transcript speaker reconciliation from caption-track voice cues", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile an ASR transcript with caption-track speaker names
    Process {
        /// ASR transcript file (Whisper-style JSON)
        #[arg(long)]
        asr: PathBuf,

        /// Diarization file (JSON array of {start, end, speaker})
        #[arg(long)]
        diarization: PathBuf,

        /// Caption track file (WebVTT-like, with <v Name> voice tags)
        #[arg(long)]
        captions: PathBuf,

        /// Output file for the machine-readable transcript (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable transcript (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Cue expansion in seconds when testing match candidacy
        #[arg(long, default_value = "0.7")]
        tolerance: f64,

        /// Minimum overlap duration in seconds for a cue to score
        #[arg(long, default_value = "0.02")]
        min_overlap: f64,

        /// Enforce one-to-one speaker/name assignment
        #[arg(long)]
        exclusive: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Inspect inputs and preview the speaker mapping without writing
    Analyze {
        /// ASR transcript file (Whisper-style JSON)
        #[arg(long)]
        asr: PathBuf,

        /// Diarization file (JSON array of {start, end, speaker})
        #[arg(long)]
        diarization: PathBuf,

        /// Caption track file (WebVTT-like, with <v Name> voice tags)
        #[arg(long)]
        captions: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            asr,
            diarization,
            captions,
            output,
            human_readable,
            tolerance,
            min_overlap,
            exclusive,
            verbose,
        } => {
            setup_logging(verbose);
            let config = ReconcileConfig {
                tolerance,
                min_overlap,
                strategy: if exclusive {
                    MatchStrategy::Exclusive
                } else {
                    MatchStrategy::Greedy
                },
            };
            process_meeting(asr, diarization, captions, output, human_readable, &config)
        }
        Commands::Analyze {
            asr,
            diarization,
            captions,
            verbose,
        } => {
            setup_logging(verbose);
            analyze_meeting(asr, diarization, captions)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn process_meeting(
    asr: PathBuf,
    diarization: PathBuf,
    captions: PathBuf,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    config: &ReconcileConfig,
) -> Result<()> {
    info!("Loading ASR transcript from {:?}", asr);
    let units = read_asr_file(&asr).context("Failed to parse ASR transcript")?;
    info!("Loaded {} ASR units", units.len());

    info!("Loading diarization from {:?}", diarization);
    let segments = read_diarization_file(&diarization).context("Failed to parse diarization")?;
    info!("Loaded {} diarization segments", segments.len());

    let phrases = assign(&segments, &units);
    info!("Assigned speakers: {} phrases", phrases.len());

    info!("Loading captions from {:?}", captions);
    let caption_text = read_caption_file(&captions).context("Failed to read caption file")?;
    let cues = parse_cues(&caption_text);
    info!("Parsed {} reference cues", cues.len());

    let result = reconcile(&phrases, &cues, config);

    let duration_seconds = result
        .phrases
        .last()
        .map(|p| p.interval.end)
        .unwrap_or(0.0);
    let metadata = RunMetadata {
        total_units: units.len(),
        total_phrases: result.phrases.len(),
        total_cues: cues.len(),
        total_speakers: result.mapping.total_speakers,
        speakers_matched: result.mapping.matched,
        duration_seconds,
    };

    let transcript =
        ReconciledTranscript::from_run(&result.phrases, &phrases, &result.mapping, metadata);
    transcript.write_json(&output)?;
    info!("Output written to {:?}", output);

    if let Some(human_path) = human_readable {
        HumanTranscript::new(&result.phrases).write_file(&human_path)?;
        info!("Human-readable output written to {:?}", human_path);
    }

    info!(
        "Complete: {}/{} speakers resolved to names",
        result.mapping.matched, result.mapping.total_speakers
    );

    Ok(())
}

fn analyze_meeting(asr: PathBuf, diarization: PathBuf, captions: PathBuf) -> Result<()> {
    let units = read_asr_file(&asr).context("Failed to parse ASR transcript")?;
    let segments = read_diarization_file(&diarization).context("Failed to parse diarization")?;
    let caption_text = read_caption_file(&captions).context("Failed to read caption file")?;

    let phrases = assign(&segments, &units);
    let cues = parse_cues(&caption_text);
    let result = reconcile(&phrases, &cues, &ReconcileConfig::default());

    println!("Meeting Analysis");
    println!("================");
    println!("ASR units: {}", units.len());
    println!("Diarization segments: {}", segments.len());
    println!("Phrases: {}", phrases.len());
    println!("Reference cues: {}", cues.len());
    println!(
        "Duration: {:.1}s",
        phrases.last().map(|p| p.interval.end).unwrap_or(0.0)
    );
    println!();

    println!("Speaker Statistics");
    println!("------------------");
    let mut seen: Vec<&str> = Vec::new();
    for phrase in &phrases {
        if !seen.contains(&phrase.speaker.as_str()) {
            seen.push(&phrase.speaker);
        }
    }
    for speaker in &seen {
        let speaker_phrases: Vec<_> = phrases.iter().filter(|p| p.speaker == *speaker).collect();
        let total_duration: f64 = speaker_phrases.iter().map(|p| p.duration()).sum();
        let word_count: usize = speaker_phrases
            .iter()
            .map(|p| p.text.split_whitespace().count())
            .sum();

        println!(
            "{}: {} phrases, {} words, {:.1}s speaking time",
            speaker,
            speaker_phrases.len(),
            word_count,
            total_duration
        );
    }
    println!();

    println!("Speaker Mapping Preview");
    println!("-----------------------");
    for speaker in &seen {
        match result.mapping.resolved(speaker) {
            Some(name) => println!("{} -> {}", speaker, name),
            None => println!("{} -> (unmatched)", speaker),
        }
    }
    println!(
        "Matched {}/{} speakers ({:.0}%)",
        result.mapping.matched,
        result.mapping.total_speakers,
        result.mapping.match_rate() * 100.0
    );

    Ok(())
}
