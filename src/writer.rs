// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Newline-delimited JSON output for census records.
///
/// Each record is serialized compactly and written as one complete line, so
/// every line of the output is an independently parseable JSON document.
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{self, Error};

/// Key under which the contributor list is merged into a metadata record.
pub const CONTRIBUTORS_KEY: &str = "contributors";

/// Merges a contributor list into a metadata record.
///
/// An existing `contributors` key in `metadata` is replaced.
///
/// # Examples
///
/// ```
/// use repo_census::merge_contributors;
/// use serde_json::{Map, json};
///
/// let mut metadata = Map::new();
/// metadata.insert("stargazerCount".to_owned(), json!(5));
/// let record = merge_contributors(metadata, vec![json!({"login": "octocat"})]);
/// assert_eq!(record["contributors"][0]["login"], "octocat");
/// ```
pub fn merge_contributors(
    mut metadata: Map<String, Value>,
    contributors: Vec<Value>
) -> Map<String, Value> {
    metadata.insert(CONTRIBUTORS_KEY.to_owned(), Value::Array(contributors));
    metadata
}

/// Streaming writer producing one JSON document per line.
///
/// The file is created (or truncated) when the writer is opened and every
/// appended record is flushed before [`append`](Self::append) returns, so
/// records survive a failure later in the run.
#[derive(Debug)]
pub struct RecordWriter {
    path:    PathBuf,
    inner:   BufWriter<File>,
    written: usize
}

impl RecordWriter {
    /// Opens `path` for writing, creating its parent directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] when the directory or the file cannot be
    /// created.
    pub fn create(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            debug!("Creating output directory {}", parent.display());
            fs::create_dir_all(parent).map_err(|source| error::output_error(parent, source))?;
        }

        let file = File::create(path).map_err(|source| error::output_error(path, source))?;

        Ok(Self {
            path:    path.to_path_buf(),
            inner:   BufWriter::new(file),
            written: 0
        })
    }

    /// Serializes `record` as one compact line and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] when the record cannot be encoded and
    /// [`Error::Output`] when writing fails.
    pub fn append<T>(&mut self, record: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized
    {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        self.inner
            .write_all(&line)
            .and_then(|()| self.inner.flush())
            .map_err(|source| error::output_error(&self.path, source))?;
        self.written += 1;

        Ok(())
    }

    /// Number of records appended so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and closes the file, returning the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] when the final flush fails.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.inner
            .flush()
            .map_err(|source| error::output_error(&self.path, source))?;
        Ok(self.written)
    }
}

/// Writes all `records` to `path`, one compact JSON document per line,
/// replacing any existing file.
///
/// # Errors
///
/// Propagates the errors of [`RecordWriter::create`] and
/// [`RecordWriter::append`]. Lines written before a failure stay in the file.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use repo_census::write_records;
/// use serde_json::json;
///
/// # fn example() -> Result<(), repo_census::Error> {
/// let count = write_records(Path::new("output/repos.json"), &[json!({"stargazerCount": 5})])?;
/// assert_eq!(count, 1);
/// # Ok(())
/// # }
/// ```
pub fn write_records<T>(path: &Path, records: &[T]) -> Result<usize, Error>
where
    T: Serialize
{
    let mut writer = RecordWriter::create(path)?;
    for record in records {
        writer.append(record)?;
    }
    writer.finish()
}
