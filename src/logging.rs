use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Log file used when none is given on the command line
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("particle-network").join("particle-network.log"))
}

/// Route `log` output to a file; the terminal belongs to the UI.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Returns the
/// file in use, or `None` when no cache directory could be found.
pub fn init(path: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_log_path) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(io::Error::other)?;

    Ok(Some(path))
}
