//! CSV output sink. One row per tick, appended and synced before the next tick.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::ProbeError;
use crate::types::Sample;

pub const HEADER: &str = "unixtimestamp,time,cpu,mem,threads,netin,netout";

const TIME_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Writers that can push written bytes down to stable storage.
pub trait SyncWrite: Write {
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SyncWrite for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

impl SyncWrite for Vec<u8> {}

pub struct CsvSink<W: SyncWrite = File> {
    out: W,
}

impl CsvSink<File> {
    /// Open `path` for appending (created if absent).
    pub fn open(path: &Path) -> Result<Self, ProbeError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ProbeError::OpenOutput {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(CsvSink::from_writer(file))
    }
}

impl<W: SyncWrite> CsvSink<W> {
    pub fn from_writer(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_line(HEADER)
    }

    pub fn write_sample(&mut self, sample: &Sample) -> io::Result<()> {
        self.write_line(&format_row(sample))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.out.sync()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

pub fn format_row(s: &Sample) -> String {
    format!(
        "{},{},{:.2},{:.3}MB,{},{}Kbps,{}Kbps",
        s.at.timestamp(),
        s.at.format(TIME_FORMAT),
        s.process.cpu_percent,
        s.process.rss_bytes as f64 / 1024.0 / 1024.0,
        s.process.threads,
        s.net.in_kbps(),
        s.net.out_kbps(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NetRates, ProcessStats};
    use chrono::{Local, TimeZone};

    fn sample(rss_bytes: u64) -> Sample {
        Sample {
            at: Local.with_ymd_and_hms(2023, 11, 14, 12, 0, 0).unwrap(),
            process: ProcessStats {
                cpu_percent: 3.2,
                rss_bytes,
                threads: 12,
            },
            net: NetRates {
                in_bps: 16_384,
                out_bps: 8_192,
            },
        }
    }

    #[test]
    fn row_layout() {
        let s = sample(47_313_895);
        let row = format_row(&s);
        assert_eq!(
            row,
            format!(
                "{},20231114 12:00:00,3.20,45.122MB,12,128Kbps,64Kbps",
                s.at.timestamp()
            )
        );
    }

    #[test]
    fn memory_is_mebibytes_with_three_decimals() {
        let row = format_row(&sample(47_316_992));
        assert!(row.contains(",45.125MB,"), "{row}");
        let row = format_row(&sample(0));
        assert!(row.contains(",0.000MB,"), "{row}");
    }

    #[test]
    fn header_written_once_before_rows() {
        let mut sink = CsvSink::from_writer(Vec::new());
        sink.write_header().unwrap();
        for _ in 0..3 {
            sink.write_sample(&sample(1024)).unwrap();
        }
        let text = String::from_utf8(sink.get_ref().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.iter().filter(|l| **l == HEADER).count(), 1);
    }

    #[test]
    fn rows_only_without_header() {
        let mut sink = CsvSink::from_writer(Vec::new());
        sink.write_sample(&sample(1024)).unwrap();
        let text = String::from_utf8(sink.get_ref().clone()).unwrap();
        assert!(!text.contains("unixtimestamp"));
        assert!(text.ends_with("Kbps\n"));
    }

    #[test]
    fn open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "previous\n").unwrap();
        let mut sink = CsvSink::open(&path).unwrap();
        sink.write_sample(&sample(1024)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("previous\n"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn open_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = CsvSink::open(&path).err().unwrap();
        assert!(err.to_string().starts_with("open output file of path"));
    }
}
