//! CSV ingestion of merged recording sessions
//!
//! One file holds one session: a header line, then one row per 6-axis
//! sample with an int64 nanosecond timestamp and an activity label.
//! Reading is buffered in fixed 4 KiB chunks with a bounded line buffer,
//! so memory use does not depend on file size.
//!
//! Parsing is strict about the header and tolerant about everything
//! after it: a malformed row (wrong field count, unparsable number,
//! non-finite value, over-long line) is counted in [`ReaderStats`] and
//! skipped, and an unrecognized activity label produces an unlabeled
//! sample. Skipped rows leave a gap in the timestamp sequence, which the
//! windowing layer already treats as a window to drop.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use actigram_core::{Activity, ImuSample};

use crate::{StorageError, StorageResult};

/// Required first line of every session file
pub const CSV_HEADER: &str = "timestamp,acc_x,acc_y,acc_z,gyr_x,gyr_y,gyr_z,activity";

/// Counters accumulated while reading one session file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Samples parsed successfully
    pub records_read: usize,
    /// Lines consumed, including the header and skipped lines
    pub lines_processed: usize,
    /// Lines dropped because they could not be parsed
    pub parse_errors: usize,
}

/// Buffered reader for one session file
///
/// The header is validated eagerly in [`SessionReader::open`]; a file
/// with reordered columns never yields a single sample, because axis
/// values would silently land in the wrong fields.
#[derive(Debug)]
pub struct SessionReader {
    file: File,
    buffer: [u8; 4096],
    buffer_pos: usize,
    buffer_len: usize,
    line_buffer: heapless::String<256>,
    eof: bool,
    stats: ReaderStats,
}

impl SessionReader {
    /// Open a session file and validate its header line
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let file = File::open(path)?;
        let mut reader = Self {
            file,
            buffer: [0; 4096],
            buffer_pos: 0,
            buffer_len: 0,
            line_buffer: heapless::String::new(),
            eof: false,
            stats: ReaderStats::default(),
        };

        match reader.read_line()? {
            Some(line) if line.trim().eq_ignore_ascii_case(CSV_HEADER) => {}
            Some(line) => {
                return Err(StorageError::Header {
                    expected: CSV_HEADER,
                    actual: line.trim().to_string(),
                })
            }
            None => {
                return Err(StorageError::Header {
                    expected: CSV_HEADER,
                    actual: String::new(),
                })
            }
        }
        Ok(reader)
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Read the next sample, skipping lines that fail to parse
    ///
    /// Returns `Ok(None)` at end of file. Only transport-level failures
    /// surface as errors; malformed rows are counted and skipped.
    pub fn next_sample(&mut self) -> StorageResult<Option<ImuSample>> {
        loop {
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            if line.trim().is_empty() {
                continue;
            }
            let parsed = parse_line(line);
            match parsed {
                Some(sample) => {
                    self.stats.records_read += 1;
                    return Ok(Some(sample));
                }
                None => self.stats.parse_errors += 1,
            }
        }
    }

    /// Read the whole session into memory
    pub fn read_all(&mut self) -> StorageResult<Vec<ImuSample>> {
        let mut samples = Vec::new();
        while let Some(sample) = self.next_sample()? {
            samples.push(sample);
        }
        Ok(samples)
    }

    /// Refill the chunk buffer, compacting unread bytes first
    fn refill(&mut self) -> StorageResult<bool> {
        if self.eof {
            return Ok(false);
        }
        if self.buffer_pos < self.buffer_len {
            let remaining = self.buffer_len - self.buffer_pos;
            self.buffer.copy_within(self.buffer_pos..self.buffer_len, 0);
            self.buffer_len = remaining;
        } else {
            self.buffer_len = 0;
        }
        self.buffer_pos = 0;

        let bytes_read = self.file.read(&mut self.buffer[self.buffer_len..])?;
        if bytes_read == 0 {
            self.eof = true;
            return Ok(self.buffer_len > 0);
        }
        self.buffer_len += bytes_read;
        Ok(true)
    }

    /// Next complete line, without its terminator
    ///
    /// A line longer than the line buffer is counted as a parse error and
    /// consumed up to its newline, so one pathological row cannot fail
    /// the rest of the file.
    fn read_line(&mut self) -> StorageResult<Option<&str>> {
        self.line_buffer.clear();
        let mut overflowed = false;

        loop {
            while self.buffer_pos < self.buffer_len {
                let byte = self.buffer[self.buffer_pos];
                self.buffer_pos += 1;

                match byte {
                    b'\n' => {
                        self.stats.lines_processed += 1;
                        if overflowed {
                            self.stats.parse_errors += 1;
                            self.line_buffer.clear();
                            overflowed = false;
                            continue;
                        }
                        return Ok(Some(self.line_buffer.as_str()));
                    }
                    b'\r' => {}
                    _ => {
                        if !overflowed && self.line_buffer.push(byte as char).is_err() {
                            overflowed = true;
                        }
                    }
                }
            }

            if !self.refill()? {
                if overflowed {
                    self.stats.lines_processed += 1;
                    self.stats.parse_errors += 1;
                    return Ok(None);
                }
                if !self.line_buffer.is_empty() {
                    self.stats.lines_processed += 1;
                    return Ok(Some(self.line_buffer.as_str()));
                }
                return Ok(None);
            }
        }
    }
}

/// Open, read, and close one session file
pub fn read_session<P: AsRef<Path>>(path: P) -> StorageResult<(Vec<ImuSample>, ReaderStats)> {
    let mut reader = SessionReader::open(path)?;
    let samples = reader.read_all()?;
    Ok((samples, reader.stats()))
}

/// Parse one data row; `None` marks the row malformed
fn parse_line(line: &str) -> Option<ImuSample> {
    let mut fields = line.split(',');

    let timestamp = fields.next()?.trim().parse::<i64>().ok()?;
    let mut axes = [0.0f64; 6];
    for slot in &mut axes {
        *slot = fields.next()?.trim().parse::<f64>().ok()?;
    }
    let label = Activity::from_label(fields.next()?);
    if fields.next().is_some() {
        return None;
    }

    let sample = ImuSample::new(timestamp, [axes[0], axes[1], axes[2]], [axes[3], axes[4], axes[5]]);
    if !sample.is_finite() {
        return None;
    }
    Some(match label {
        Some(activity) => sample.with_label(activity),
        None => sample,
    })
}
