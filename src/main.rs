//! Gabble CLI — generate synthetic chat messages from a transcript file.
//!
//! Thin wrapper over the `gabble` library crate. The transcript is a TSV
//! file with one `sender<TAB>message` entry per line, in chronological
//! order; blank lines and `#` comments are skipped.

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use gabble::{Chat, ChatConfig};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Gabble — a two-level Markov chat generator.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Transcript file: one "sender<TAB>message" line per entry.
    #[arg(long)]
    transcript: PathBuf,

    /// Number of messages to generate (finite runs may end sooner).
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Sender the first generated message replies to.
    /// Defaults to the first transcript sender.
    #[arg(long)]
    head: Option<String>,

    /// Terminate generation at the last transcript sender instead of
    /// wrapping around.
    #[arg(long)]
    finite: bool,

    /// Maximum tokens per generated message.
    #[arg(long, default_value_t = 100)]
    max_walk_length: usize,

    /// Disable the per-sender word-model cache.
    #[arg(long)]
    no_cache: bool,

    /// PRNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

/// Parse the TSV transcript format.
fn load_transcript(path: &PathBuf) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    let mut transcript = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((sender, message)) = trimmed.split_once('\t') else {
            return Err(format!(
                "{}:{}: expected \"sender<TAB>message\"",
                path.display(),
                number + 1
            )
            .into());
        };
        transcript.push((sender.to_string(), message.to_string()));
    }

    Ok(transcript)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    });

    let transcript = load_transcript(&args.transcript)?;
    eprintln!(
        "Loaded {} transcript entries from {}.",
        transcript.len(),
        args.transcript.display()
    );

    let config = ChatConfig {
        finite: args.finite,
        max_walk_length: args.max_walk_length,
        enhance: !args.no_cache,
    };
    let mut chat = Chat::new(transcript, &config, SmallRng::seed_from_u64(seed))?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    for pair in chat.generate(args.head).take(args.count) {
        let (sender, text) = pair?;
        writeln!(stdout, "{sender}: {text}")?;
    }

    Ok(())
}
