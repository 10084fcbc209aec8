use std::fs::File;
use std::io;
use std::path::Path;

use csv::Writer;

pub const TRACE_HEADER: [&str; 3] = ["Time", "Target", "State"];

/// Three-column time series of a simulation run.
pub struct TraceWriter<W: io::Write> {
    writer: Writer<W>,
    rows: usize,
}

impl TraceWriter<File> {
    /// Creates `path` and its parent directories, then writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        TraceWriter::new(File::create(path)?).map_err(io::Error::from)
    }
}

impl TraceWriter<io::Sink> {
    pub fn discard() -> Result<Self, csv::Error> {
        TraceWriter::new(io::sink())
    }
}

impl<W: io::Write> TraceWriter<W> {
    pub fn new(inner: W) -> Result<Self, csv::Error> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(TRACE_HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write_row(&mut self, time: f64, target: f64, state: f64) -> Result<(), csv::Error> {
        self.writer.write_record(&[
            time.to_string(),
            target.to_string(),
            state.to_string(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes buffered rows and hands back the underlying writer.
    pub fn finish(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

#[cfg(test)]
mod trace_tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let mut trace = TraceWriter::new(Vec::new()).unwrap();
        trace.write_row(0.01, 1.0, 0.5).unwrap();
        trace.write_row(0.02, 1.0, 0.75).unwrap();
        assert_eq!(trace.rows(), 2);

        let bytes = trace.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "Time,Target,State\n0.01,1,0.5\n0.02,1,0.75\n");
    }

    #[test]
    fn test_empty_trace_has_only_header() {
        let trace = TraceWriter::new(Vec::new()).unwrap();
        let text = String::from_utf8(trace.finish().unwrap()).unwrap();

        assert_eq!(text, "Time,Target,State\n");
    }
}
