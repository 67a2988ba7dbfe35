//! Tor v3 vanity key generator CLI

use clap::Parser;
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tor_vanity_keygen::{format_speed, SearchError, Searcher};

#[derive(Parser)]
#[command(name = "tvk")]
#[command(about = "Tor v3 vanity onion address and key generator")]
#[command(version)]
struct Cli {
    /// Desired address prefix (lowercase base32: a-z, 2-7)
    prefix: String,

    /// Output directory for the generated key files
    #[arg(short, long, default_value = ".")]
    dst: PathBuf,

    /// Number of worker threads
    #[arg(short = 't', long, default_value_t = num_cpus::get())]
    threads: usize,
}

/// Pretty duration formatter
struct PrettyDur(chrono::Duration);

impl std::fmt::Display for PrettyDur {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.num_weeks() >= 52 {
            write!(f, "{} years, ", self.0.num_weeks() / 52)?;
        }
        if self.0.num_weeks() % 52 > 0 {
            write!(f, "{} weeks, ", self.0.num_weeks() % 52)?;
        }
        if self.0.num_days() % 7 > 0 {
            write!(f, "{} days, ", self.0.num_days() % 7)?;
        }
        if self.0.num_hours() % 24 > 0 {
            write!(f, "{} hours, ", self.0.num_hours() % 24)?;
        }
        if self.0.num_minutes() % 60 > 0 {
            write!(f, "{} minutes, ", self.0.num_minutes() % 60)?;
        }
        write!(f, "{} seconds", self.0.num_seconds() % 60)
    }
}

fn pretty(dur: Duration) -> PrettyDur {
    PrettyDur(chrono::Duration::from_std(dur).unwrap_or_else(|_| chrono::Duration::zero()))
}

/// Like [`pretty`], but tolerant of the absurd estimates a long prefix
/// produces (which overflow a std Duration)
fn pretty_secs(secs: f64) -> PrettyDur {
    pretty(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
}

fn main() {
    let cli = Cli::parse();

    if cli.prefix.is_empty() {
        eprintln!("Error: empty prefix");
        eprintln!("Usage: tvk <PREFIX> [-d <DIR>] [-t <THREADS>]");
        std::process::exit(2);
    }
    if !cli
        .prefix
        .chars()
        .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c))
    {
        eprintln!(
            "Error: '{}' can never match an onion address (use a-z, 2-7)",
            cli.prefix
        );
        std::process::exit(2);
    }
    if !cli.dst.is_dir() {
        eprintln!("Error: '{}' is not a directory", cli.dst.display());
        std::process::exit(2);
    }

    let expected = 2_f64.powi(5 * cli.prefix.len() as i32);

    println!("=== Tor v3 Vanity Key Generator ===");
    println!("Prefix: {}", cli.prefix);
    println!("Output: {}", cli.dst.display());
    println!("Threads: {}", cli.threads);
    println!("Difficulty: 1 in {:.0}", expected);
    println!();
    println!("Press ctrl-c to abort");
    println!();

    let (progress_tx, progress_rx) = unbounded();
    let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);

    let stop_tx_clone = stop_tx.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nStopping...");
        let _ = stop_tx_clone.send(());
    })
    .ok();

    let prefix = cli.prefix.clone();
    let dst = cli.dst.clone();
    let searcher = Searcher::with_threads(cli.threads);
    let handle = std::thread::spawn(move || searcher.run(&prefix, &dst, progress_tx, stop_rx));

    let mut last_log = Instant::now();
    loop {
        if let Ok(progress) = progress_rx.try_recv() {
            if last_log.elapsed() > Duration::from_secs(10) {
                let progress_pct = progress.attempts as f64 / expected;
                let expected_secs = if progress_pct > 0.0 {
                    progress.elapsed_secs / progress_pct
                } else {
                    0.0
                };

                println!(
                    "Progress: {:.2e} / {:.2e} keys ({:.4}%)",
                    progress.attempts as f64,
                    expected,
                    progress_pct * 100.0
                );
                println!("Speed: {} keys/sec", format_speed(progress.keys_per_sec));
                println!(
                    "Elapsed: {} / Est. total: {}",
                    pretty_secs(progress.elapsed_secs),
                    pretty_secs(expected_secs)
                );
                println!("Candidate: {}", progress.sample);
                println!();

                last_log = Instant::now();
            }
        }

        if handle.is_finished() {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    match handle.join() {
        Ok(Ok(outcome)) => {
            let secs = outcome.elapsed.as_secs_f64();
            println!();
            println!("=== Complete! ===");
            println!("Onion address: {}.onion", outcome.onion_address);
            println!("Keys saved to: {}", outcome.dir.display());
            println!(
                "{} attempts in {:.3} seconds: {:.0} attempts/s",
                outcome.attempts,
                secs,
                outcome.attempts as f64 / secs.max(0.001)
            );
        }
        Ok(Err(SearchError::Stopped)) => {
            eprintln!();
            eprintln!("Search stopped before a match was found");
            std::process::exit(130);
        }
        Ok(Err(e @ SearchError::InvalidPrefix(_))) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
        Ok(Err(e)) => {
            eprintln!();
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("Search thread panicked");
            std::process::exit(1);
        }
    }
}
