use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::queues::request::Request;

const HEADER: &str = "id,arrival_time,processing_time,deadline,start_processing_time,end_processing_time,finish_state";

/// Buffers request records and writes them out as CSV every `buffer_size`
/// records. Whatever is left is written by `flush` or on drop.
pub struct RecordLogger<W>
where
    W: Write,
{
    buffer: Vec<Request>,
    buffer_size: usize,
    writer: W,
    header_written: bool,
}

impl RecordLogger<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(buffer_size: usize, path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(RecordLogger::new(buffer_size, BufWriter::new(file)))
    }
}

impl<W> RecordLogger<W>
where
    W: Write,
{
    pub fn new(buffer_size: usize, writer: W) -> Self {
        let buffer_size = buffer_size.max(1);
        RecordLogger {
            buffer: Vec::with_capacity(buffer_size),
            buffer_size,
            writer,
            header_written: false,
        }
    }

    pub fn log(&mut self, req: &Request) -> io::Result<()> {
        self.buffer.push(req.clone());
        if self.buffer.len() >= self.buffer_size {
            self.dump_log()?;
        }
        Ok(())
    }

    pub fn log_all<'r, I>(&mut self, requests: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'r Request>,
    {
        for req in requests {
            self.log(req)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.dump_log()?;
        self.writer.flush()
    }

    fn dump_log(&mut self) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{}", HEADER)?;
            self.header_written = true;
        }
        for req in self.buffer.drain(..) {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{}",
                req.id(),
                req.arrival_time(),
                req.processing_time(),
                req.deadline(),
                optional(req.start_processing_time()),
                optional(req.end_processing_time()),
                req.finish_state(),
            )?;
        }
        Ok(())
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl<W> Drop for RecordLogger<W>
where
    W: Write,
{
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!("failed to write request records on drop: {err}");
        }
    }
}
