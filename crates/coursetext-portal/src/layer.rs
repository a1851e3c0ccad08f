use std::sync::Arc;
use std::time::Duration;

use coursetext_common::config::{Config, DEFAULT_RESCAN_DELAYS_MS};
use coursetext_common::{ParseOptions, ParsedTextResult, Term};
use coursetext_renderer::{TextPipeline, scan_markers};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::host::MarkerHost;
use crate::overlay::Overlays;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Inputs {
    content: Option<String>,
    terms: Vec<Term>,
    options: ParseOptions,
}

/// Rescans scheduled by one injection.
struct PendingRescans {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl PendingRescans {
    fn cancel(self) {
        self.token.cancel();
        for handle in self.handles {
            handle.abort();
        }
    }
}

/// Renders text into a [`MarkerHost`] and keeps its marker overlays current.
///
/// Deferred rescans are spawned on the ambient tokio runtime. Without one,
/// only the synchronous scan after each injection happens.
pub struct PortalLayer<H: MarkerHost> {
    host: Arc<H>,
    pipeline: TextPipeline,
    delays: Vec<Duration>,
    inputs: Option<Inputs>,
    result: Option<ParsedTextResult>,
    overlays: watch::Sender<Overlays>,
    pending: Option<PendingRescans>,
}

impl<H: MarkerHost> PortalLayer<H> {
    pub fn new(host: H) -> Self {
        Self {
            host: Arc::new(host),
            pipeline: TextPipeline::new(),
            delays: DEFAULT_RESCAN_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
            inputs: None,
            result: None,
            overlays: watch::Sender::new(Overlays::default()),
            pending: None,
        }
    }

    /// Sanitizer allow-list and rescan schedule from `config`.
    pub fn with_config(host: H, config: &Config) -> Self {
        let mut layer = Self::new(host);
        layer.pipeline = TextPipeline::with_sanitizer_config(config.sanitizer.clone());
        layer.delays = config.rescan_delays();
        layer
    }

    pub fn with_delays(mut self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.delays = delays.into_iter().collect();
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Latest pipeline output, once [`update`](Self::update) has run.
    pub fn result(&self) -> Option<&ParsedTextResult> {
        self.result.as_ref()
    }

    /// Receiver for the overlays; every scan replaces the value.
    pub fn subscribe(&self) -> watch::Receiver<Overlays> {
        self.overlays.subscribe()
    }

    pub fn overlays(&self) -> Overlays {
        self.overlays.borrow().clone()
    }

    /// Rescans scheduled and not yet finished.
    pub fn pending_rescans(&self) -> usize {
        self.pending
            .as_ref()
            .map_or(0, |pending| {
                pending
                    .handles
                    .iter()
                    .filter(|handle| !handle.is_finished())
                    .count()
            })
    }

    /// Render `content` into the host if any input differs from the last
    /// call. Returns whether a render happened.
    ///
    /// A render cancels all pending rescans, injects the sanitized HTML,
    /// scans it at once and schedules the deferred rescans.
    pub fn update(&mut self, content: Option<&str>, terms: &[Term], options: ParseOptions) -> bool {
        let inputs = Inputs {
            content: content.map(str::to_owned),
            terms: terms.to_vec(),
            options,
        };
        if self.inputs.as_ref() == Some(&inputs) {
            return false;
        }

        self.cancel_pending();
        let result = self.pipeline.parse_text(content, terms, options);
        self.host.inject(&result.parsed_text);
        let entries: Arc<[Term]> = result.glossary_entries.clone().into();
        rescan(self.host.as_ref(), &entries, &self.overlays);
        self.schedule_rescans(entries);

        self.inputs = Some(inputs);
        self.result = Some(result);
        true
    }

    /// Cancel pending rescans and forget the last inputs. The host keeps
    /// its content.
    pub fn unmount(&mut self) {
        self.cancel_pending();
        self.inputs = None;
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::trace!(count = pending.handles.len(), "cancelling pending rescans");
            pending.cancel();
        }
    }

    fn schedule_rescans(&mut self, entries: Arc<[Term]>) {
        if self.delays.is_empty() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime, deferred rescans skipped");
            return;
        };

        let token = CancellationToken::new();
        let handles = self
            .delays
            .iter()
            .map(|&delay| {
                let token = token.clone();
                let host = Arc::clone(&self.host);
                let entries = Arc::clone(&entries);
                let overlays = self.overlays.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            tracing::trace!(?delay, "rescanning markers");
                            rescan(host.as_ref(), &entries, &overlays);
                        }
                    }
                })
            })
            .collect();
        self.pending = Some(PendingRescans { token, handles });
    }
}

impl<H: MarkerHost> Drop for PortalLayer<H> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn rescan<H: MarkerHost>(host: &H, entries: &[Term], overlays: &watch::Sender<Overlays>) {
    let Some(html) = host.snapshot() else {
        tracing::debug!("host detached, skipping marker scan");
        return;
    };
    let scan = scan_markers(&html);
    overlays.send_replace(Overlays::pair(scan, entries));
}
