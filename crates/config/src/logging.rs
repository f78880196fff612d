use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use giclass_common::{Error, Result};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::paths::ensure_directory;
use crate::settings::Settings;

/// Rotation threshold for the server log file
pub const LOG_MAX_BYTES: u64 = 10_000_000;
/// Number of rotated log files kept on disk
pub const LOG_BACKUP_COUNT: usize = 10;

/// Size- and count-bounded rotating log sink.
///
/// Appends to `path` until the byte bound would be exceeded, then renames the
/// file to `<path>.1` (existing backups shift up, the oldest is dropped) and
/// starts a fresh file. Handles are cheap clones over a shared file.
#[derive(Clone)]
pub struct RotatingFileAppender {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFileAppender {
    pub fn new<P: AsRef<Path>>(path: P, max_bytes: u64, backups: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                path,
                file,
                written,
                max_bytes,
                backups,
            })),
        })
    }
}

impl Inner {
    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups == 0 {
            // no backups retained: restart the file in place
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.backup_path(self.backups);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }
        for index in (1..self.backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                std::fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        std::fs::rename(&self.path, self.backup_path(1))?;

        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log appender lock poisoned"))?;

        if inner.written > 0 && inner.written + buf.len() as u64 > inner.max_bytes {
            inner.rotate()?;
        }

        let count = inner.file.write(buf)?;
        inner.written += count as u64;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log appender lock poisoned"))?;
        inner.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileAppender {
    type Writer = RotatingFileAppender;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Event formatter producing
/// `<timestamp> <LEVEL>: <message> [in <source-path>:<line>]`
pub struct LogLineFormat;

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        write!(writer, "{timestamp} {}: ", metadata.level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            write!(writer, " [in {file}:{line}]")?;
        }
        writeln!(writer)
    }
}

/// Install the global tracing subscriber for the resolved settings.
///
/// Console output is always enabled. The rotating file sink is attached only
/// when the profile is not in debug mode.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_new(settings.log_level.to_lowercase()).map_err(|err| {
        Error::Config(format!(
            "invalid LOG_LEVEL {:?}: {err}",
            settings.log_level
        ))
    })?;

    let file_layer = if settings.debug {
        None
    } else {
        if let Some(parent) = settings.log_file.parent() {
            ensure_directory(parent)?;
        }
        let appender = RotatingFileAppender::new(&settings.log_file, LOG_MAX_BYTES, LOG_BACKUP_COUNT)?;
        Some(
            fmt::layer()
                .event_format(LogLineFormat)
                .with_ansi(false)
                .with_writer(appender),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|err| Error::Config(format!("failed to install tracing subscriber: {err}")))?;

    Ok(())
}
