//! Interval changes that survive a restart.

use std::io;
use std::path::Path;

use serde::Serialize;

#[derive(Serialize)]
struct IntervalOverride {
    scheduler: IntervalSection,
}

#[derive(Serialize)]
struct IntervalSection {
    interval_minutes: u32,
}

/// Writes `minutes` to `path` as a config fragment the loader merges last.
///
/// The file is replaced by rename so a crash never leaves it half written.
pub(crate) async fn write_interval_file(path: &Path, minutes: u32) -> io::Result<()> {
    let body = toml::to_string(&IntervalOverride {
        scheduler: IntervalSection {
            interval_minutes: minutes,
        },
    })
    .map_err(io::Error::other)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await
}
