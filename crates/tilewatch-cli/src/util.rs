use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use tilewatch_heuristic::HeuristicRegistry;
use tilewatch_record::store::JsonFileStore;
use tilewatch_tracker::TrackerSession;

/// Destination of command output: a file, or stdout when the path is `-`.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `path`.
    pub fn save_json<T>(value: &T, path: &Path) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        Output::for_path(path)?.write_json(value)
    }

    /// Opens `path` for writing, creating missing parent directories.
    pub fn for_path(path: &Path) -> anyhow::Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(Output::Stdout {
                writer: io::stdout().lock(),
            });
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let path = self.display_path();
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {path}"))?;
        writeln!(self).with_context(|| format!("Failed to write newline to {path}"))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {path}"))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_text_file<P>(file_kind: &str, path: P) -> anyhow::Result<String>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", file_kind, path.display()))
}

/// Opens the tracker session persisted under `data_dir`.
pub fn open_session(data_dir: &Path) -> TrackerSession<JsonFileStore> {
    let store = JsonFileStore::in_dir(data_dir);
    TrackerSession::new(HeuristicRegistry::builtin(), store)
}
