//! Date-keyed rotating output streams.
//!
//! A stream owns one family of files in the base directory, named
//! `<stem><YYYYMMDD>.log`, plus a stable alias that always resolves to the
//! current day's file. Nothing touches the filesystem until the first line
//! is routed to the stream: the dated file and its alias appear on first
//! write, and the date check runs lazily on every write. When the date
//! rolls over the stream reopens, repoints the alias, and prunes its own
//! historical files whose file-name date fell out of the retention window.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate};
use parking_lot::Mutex;

const DATE_FORMAT: &str = "%Y%m%d";

pub(crate) struct RotatingFileWriter {
    dir: PathBuf,
    /// File-name stem including any prefix, e.g. `"myapp-combined-"`.
    stem: String,
    /// Alias file name, e.g. `"latest-combined-myapp-log"`.
    alias: String,
    retention_days: i64,
    state: Mutex<StreamState>,
}

#[derive(Default)]
struct StreamState {
    file: Option<File>,
    open_date: Option<NaiveDate>,
}

impl RotatingFileWriter {
    pub(crate) fn new(dir: PathBuf, stem: String, alias: String, retention_days: u32) -> Self {
        Self {
            dir,
            stem,
            alias,
            retention_days: i64::from(retention_days),
            state: Mutex::new(StreamState::default()),
        }
    }

    /// Append one rendered line, rotating first if the date changed.
    ///
    /// Best-effort: write and rotation failures after construction are
    /// absorbed here so a full disk never propagates into the caller's
    /// request path.
    pub(crate) fn write_line(&self, line: &[u8]) {
        let mut state = self.state.lock();
        let today = Local::now().date_naive();
        if state.open_date != Some(today) && self.rotate(&mut state, today).is_err() {
            return;
        }
        if let Some(file) = state.file.as_mut() {
            let _ = file.write_all(line);
        }
    }

    pub(crate) fn flush(&self) {
        let mut state = self.state.lock();
        if let Some(file) = state.file.as_mut() {
            let _ = file.flush();
        }
    }

    /// Flush and close the current file; a later write reopens.
    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        if let Some(mut file) = state.file.take() {
            let _ = file.flush();
        }
        state.open_date = None;
    }

    fn rotate(&self, state: &mut StreamState, today: NaiveDate) -> io::Result<()> {
        if let Some(mut previous) = state.file.take() {
            let _ = previous.flush();
        }
        let name = self.file_name(today);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(&name))?;
        state.file = Some(file);
        state.open_date = Some(today);
        self.repoint_alias(&name);
        self.prune(today);
        Ok(())
    }

    fn file_name(&self, date: NaiveDate) -> String {
        format!("{}{}.log", self.stem, date.format(DATE_FORMAT))
    }

    /// Repoint the alias at `target` via a temporary link and rename, so
    /// readers never observe a missing alias.
    fn repoint_alias(&self, target: &str) {
        let staged = self.dir.join(format!("{}.tmp", self.alias));
        let _ = fs::remove_file(&staged);
        if symlink(Path::new(target), &staged).is_ok() {
            let _ = fs::rename(&staged, self.dir.join(&self.alias));
        }
    }

    /// Delete this stream's own files whose file-name date is older than
    /// the retention window. Files of other stems are never touched.
    fn prune(&self, today: NaiveDate) {
        let cutoff = today - Duration::days(self.retention_days);
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(date) = self.own_file_date(name) else {
                continue;
            };
            if date < cutoff {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    fn own_file_date(&self, name: &str) -> Option<NaiveDate> {
        let digits = name.strip_prefix(self.stem.as_str())?.strip_suffix(".log")?;
        NaiveDate::parse_from_str(digits, DATE_FORMAT).ok()
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
