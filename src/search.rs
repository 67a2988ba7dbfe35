//! Brute-force vanity search over a pool of worker threads
//!
//! Each worker iteration is generate -> derive -> match. Workers share a
//! relaxed attempt counter for reporting, a stop flag checked at every
//! iteration, and a single-assignment winner slot: exactly one worker
//! claims the match, and the driver then expands and persists the key.

use crossbeam_channel::{Receiver, Sender};
use rand::rngs::OsRng;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::keyfile;
use crate::keys::{self, Candidate};
use crate::onion;

/// Errors that can end a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("entropy source failure: {0}")]
    Entropy(#[from] rand::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prefix '{0}' can never match an onion address (use a-z, 2-7)")]
    InvalidPrefix(String),

    #[error("thread pool error: {0}")]
    Pool(String),

    #[error("search stopped before a match was found")]
    Stopped,
}

/// Progress snapshot sent at batch boundaries
///
/// Advisory only; the counter is read with relaxed ordering.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub attempts: u64,
    pub keys_per_sec: f64,
    pub elapsed_secs: f64,
    /// A recently derived candidate address
    pub sample: String,
}

/// The result of a successful search, returned after the key files are
/// fully written
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub onion_address: String,
    pub attempts: u64,
    pub elapsed: Duration,
    pub dir: PathBuf,
}

/// Keys checked between stop-flag polls and progress updates
const BATCH_SIZE: usize = 10_000;

/// Vanity search driver
#[derive(Debug, Clone)]
pub struct Searcher {
    thread_count: usize,
}

impl Searcher {
    /// Create a searcher using all available cores
    pub fn new() -> Self {
        Self {
            thread_count: num_cpus::get(),
        }
    }

    /// Create a searcher with a specific worker count
    pub fn with_threads(thread_count: usize) -> Self {
        Self { thread_count }
    }

    /// Search until an address starting with `prefix` is found, then
    /// write the key set into `dst` and return the outcome
    ///
    /// The loop is unbounded: it ends only on a match, a stop signal, or
    /// a fatal error. An empty prefix matches the first candidate. The
    /// match itself is byte-exact (see [`onion::matches_prefix`]); a
    /// prefix outside the lowercase base32 alphabet is rejected up front
    /// because no address could ever satisfy it.
    pub fn run(
        &self,
        prefix: &str,
        dst: &Path,
        progress_tx: Sender<Progress>,
        stop_rx: Receiver<()>,
    ) -> Result<SearchOutcome, SearchError> {
        if !prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c))
        {
            return Err(SearchError::InvalidPrefix(prefix.to_string()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.thread_count)
            .build()
            .map_err(|e| SearchError::Pool(e.to_string()))?;

        let counter = AtomicU64::new(0);
        let stop = AtomicBool::new(false);
        let claimed = AtomicBool::new(false);
        let winner: Mutex<Option<(Candidate, String)>> = Mutex::new(None);
        let fatal: Mutex<Option<SearchError>> = Mutex::new(None);
        let sample: Mutex<String> = Mutex::new(String::new());
        let start = Instant::now();

        pool.install(|| {
            loop {
                if stop_rx.try_recv().is_ok() {
                    stop.store(true, Ordering::SeqCst);
                }
                if stop.load(Ordering::SeqCst) {
                    break;
                }

                (0..BATCH_SIZE).into_par_iter().for_each(|i| {
                    if stop.load(Ordering::Relaxed) {
                        return;
                    }

                    let candidate = match keys::generate(&mut OsRng) {
                        Ok(candidate) => candidate,
                        Err(e) => {
                            let mut slot = fatal.lock().unwrap();
                            if slot.is_none() {
                                *slot = Some(SearchError::Entropy(e));
                            }
                            stop.store(true, Ordering::SeqCst);
                            return;
                        }
                    };

                    let address = onion::onion_address(&candidate.public);
                    counter.fetch_add(1, Ordering::Relaxed);

                    if i == 0 {
                        *sample.lock().unwrap() = address.clone();
                    }

                    if onion::matches_prefix(&address, prefix)
                        && claimed
                            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                            .is_ok()
                    {
                        *winner.lock().unwrap() = Some((candidate, address));
                        stop.store(true, Ordering::SeqCst);
                    }
                });

                let attempts = counter.load(Ordering::Relaxed);
                let elapsed_secs = start.elapsed().as_secs_f64();
                let keys_per_sec = if elapsed_secs > 0.0 {
                    attempts as f64 / elapsed_secs
                } else {
                    0.0
                };
                let _ = progress_tx.send(Progress {
                    attempts,
                    keys_per_sec,
                    elapsed_secs,
                    sample: sample.lock().unwrap().clone(),
                });
            }
        });

        if let Some(err) = fatal.into_inner().unwrap() {
            return Err(err);
        }

        let attempts = counter.load(Ordering::Relaxed);

        // A stop signal racing a claimed match must not discard the
        // winner: a match without a persisted key is a lost result.
        if let Some((candidate, address)) = winner.into_inner().unwrap() {
            let expanded = keys::expand_secret(&candidate.seed);
            keyfile::write_key_set(dst, &candidate.public, &expanded, &address)?;
            return Ok(SearchOutcome {
                onion_address: address,
                attempts,
                elapsed: start.elapsed(),
                dir: dst.to_path_buf(),
            });
        }

        Err(SearchError::Stopped)
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a key rate for display
pub fn format_speed(speed: f64) -> String {
    if speed >= 1_000_000_000.0 {
        format!("{:.1}B", speed / 1_000_000_000.0)
    } else if speed >= 1_000_000.0 {
        format!("{:.1}M", speed / 1_000_000.0)
    } else if speed >= 1_000.0 {
        format!("{:.1}K", speed / 1_000.0)
    } else {
        format!("{:.0}", speed)
    }
}
