//! File logging: a rotating `kwuq.log` in the data directory, plus a
//! `run.log` inside each run directory that keeps the propagation trace
//! next to the results it produced.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::Subscriber;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the log file inside the data directory
pub const LOG_FILE: &str = "kwuq.log";
/// Name of the per-run log inside a run directory
pub const RUN_LOG_FILE: &str = "run.log";

/// Size-based trimming of a log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Trim once the file grows beyond this many bytes
    pub max_size: u64,
    /// Bytes of recent entries kept after trimming
    pub keep_size: u64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: 5 * 1024 * 1024,
            keep_size: 1024 * 1024,
        }
    }
}

impl RotationPolicy {
    /// Trim `path` to its last `keep_size` bytes, starting at a line boundary.
    /// Returns whether the file was rewritten.
    pub fn apply(&self, path: &Path) -> io::Result<bool> {
        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if size <= self.max_size {
            return Ok(false);
        }

        let mut tail = Vec::new();
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(size.saturating_sub(self.keep_size)))?;
        file.read_to_end(&mut tail)?;
        drop(file);

        let first_line = tail.iter().position(|&b| b == b'\n').map_or(0, |i| i + 1);
        let mut file = File::create(path)?;
        file.write_all(b"--- Log rotated (older entries removed) ---\n")?;
        file.write_all(&tail[first_line..])?;
        Ok(true)
    }
}

fn open_append(path: &Path) -> io::Result<Mutex<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Mutex::new(file))
}

/// Subscriber writing to `{data_dir}/kwuq.log` and, if given, `{run_dir}/run.log`.
///
/// The data-directory log uses `RUST_LOG` when set, otherwise
/// `kwuq={level},kwuq_core=warn`. The run log records both crates at `level`.
fn build_subscriber(
    data_dir: &Path,
    level: &str,
    run_dir: Option<&Path>,
) -> Result<impl Subscriber + Send + Sync + 'static> {
    let run_level: LevelFilter = level
        .parse()
        .map_err(|e| eyre!("invalid log level '{level}': {e}"))?;

    fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join(LOG_FILE);
    if let Err(e) = RotationPolicy::default().apply(&log_path) {
        eprintln!("Warning: Failed to rotate log file: {e}");
    }

    let default_filter = format!("kwuq={level},kwuq_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));
    let data_layer = fmt::layer()
        .with_writer(open_append(&log_path)?)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(env_filter);

    let run_layer = match run_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let layer = fmt::layer()
                .with_writer(open_append(&dir.join(RUN_LOG_FILE))?)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_filter(Targets::new().with_target("kwuq", run_level));
            Some(layer)
        }
        None => None,
    };

    Ok(tracing_subscriber::registry().with(data_layer).with(run_layer))
}

/// Install the global subscriber, see [`build_subscriber`].
pub fn init_logging(data_dir: &Path, level: &str, run_dir: Option<&Path>) -> Result<()> {
    build_subscriber(data_dir, level, run_dir)?.try_init()?;
    tracing::info!(
        data_dir = %data_dir.display(),
        run_dir = ?run_dir.map(Path::display),
        "kwuq logging initialized"
    );
    Ok(())
}
