use crate::engine::events::DownloadEvent;

/// Rendering surface fed by the UI context.
pub trait DisplaySink {
    /// Append decoded text; called once per chunk.
    fn append_text(&mut self, chunk: &str);

    /// Discard everything displayed so far.
    fn clear(&mut self);

    /// Show a status, warning, error, or completion message.
    fn notify(&mut self, message: &str);
}

/// Apply one event to `sink`. Returns `true` when the event ends the run.
pub fn dispatch<S: DisplaySink + ?Sized>(event: &DownloadEvent, sink: &mut S) -> bool {
    match event {
        DownloadEvent::Chunk(text) => sink.append_text(text),
        DownloadEvent::Cleared => sink.clear(),
        other => {
            if let Some(message) = other.message() {
                sink.notify(&message);
            }
        }
    }
    event.is_terminal()
}

/// Apply every event already queued on `rx` without waiting.
/// Returns `true` if one of them ended the run.
pub fn drain<S: DisplaySink + ?Sized>(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<DownloadEvent>,
    sink: &mut S,
) -> bool {
    let mut finished = false;
    while let Ok(event) = rx.try_recv() {
        finished |= dispatch(&event, sink);
    }
    finished
}
