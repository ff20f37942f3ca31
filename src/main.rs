// Terminal front-end: Enter toggles the download, text streams to stdout with line numbers.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use partial_viewer::api::simple::init_tracing;
use partial_viewer::config::DEFAULT_URL;
use partial_viewer::display::dispatch;
use partial_viewer::{DisplaySink, DownloadController, HttpSource, Transcript, ViewerConfig};

/// Writes the transcript to a terminal, prefixing each new line with its number.
struct TerminalSink<W: Write> {
    out: W,
    transcript: Transcript,
    write_errors: usize,
}

impl<W: Write> TerminalSink<W> {
    fn new(out: W) -> Self {
        let mut sink = Self {
            out,
            transcript: Transcript::new(),
            write_errors: 0,
        };
        sink.report(|out| write_gutter(out, 1));
        sink
    }

    /// Run a write and flush. A failure is logged on its first occurrence
    /// and counted after that; the transcript keeps going either way.
    fn report(&mut self, write: impl FnOnce(&mut W) -> io::Result<()>) {
        if let Err(e) = write(&mut self.out).and_then(|()| self.out.flush()) {
            if self.write_errors == 0 {
                warn!("terminal write failed: {}", e);
            }
            self.write_errors += 1;
        }
    }

    fn write_numbered(&mut self, text: &str) {
        let first_line = self.transcript.line_count();
        self.transcript.append_text(text);
        self.report(|out| {
            for (i, segment) in text.split('\n').enumerate() {
                if i > 0 {
                    writeln!(out)?;
                    write_gutter(out, first_line + i)?;
                }
                write!(out, "{}", segment)?;
            }
            Ok(())
        });
    }
}

fn write_gutter<W: Write>(out: &mut W, line: usize) -> io::Result<()> {
    write!(out, "{:>6} | ", line)
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn append_text(&mut self, chunk: &str) {
        self.write_numbered(chunk);
    }

    fn clear(&mut self) {
        self.transcript.clear();
        self.report(|out| {
            writeln!(out, "\n{}", "-".repeat(40))?;
            write_gutter(out, 1)
        });
    }

    fn notify(&mut self, message: &str) {
        self.write_numbered(message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ViewerConfig::default();
    let source = Arc::new(HttpSource::new(&config)?);
    let (controller, mut events) = DownloadController::new(source, config);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    eprint!("Text File URL [{}]: ", DEFAULT_URL);
    let url = match input.next_line().await? {
        Some(line) if !line.trim().is_empty() => line.trim().to_string(),
        _ => DEFAULT_URL.to_string(),
    };
    eprintln!("Enter starts or pauses the download, q quits.");

    let mut sink = TerminalSink::new(io::stdout());
    loop {
        tokio::select! {
            line = input.next_line() => {
                match line? {
                    None => break,
                    Some(line) if line.trim() == "q" => break,
                    Some(_) => {
                        if controller.is_active() {
                            controller.stop();
                        } else {
                            let _ = controller.start(&url);
                        }
                    }
                }
            }
            Some(event) = events.recv() => {
                dispatch(&event, &mut sink);
            }
        }
    }

    controller.stop();
    let stats = controller.snapshot();
    eprintln!(
        "\n{} lines shown, {} bytes received over {} runs",
        sink.transcript.line_count(),
        stats.total_bytes,
        stats.runs_started
    );
    Ok(())
}
