//! Shared toast queue.
//!
//! Any component holds a cloneable [`Toaster`] and posts messages over a
//! channel. One [`ToastRenderer`] task owns the visible list and a timer per
//! message; observers read the list through a watch channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agentdesk_core::toast::{Toast, ToastKind, DEFAULT_TOAST_TTL};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::debug;

enum ToastCommand {
    Show(Toast),
    Dismiss(u64),
}

#[derive(Clone)]
pub struct Toaster {
    tx: mpsc::UnboundedSender<ToastCommand>,
    next_id: Arc<AtomicU64>,
}

impl Toaster {
    /// Create a connected toaster / renderer pair.
    pub fn channel() -> (Toaster, ToastRenderer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (visible, _) = watch::channel(Vec::new());
        let toaster = Toaster {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (toaster, ToastRenderer { rx, visible })
    }

    /// Show a toast for the default three seconds. Returns its id.
    pub fn toast(&self, text: impl Into<String>, kind: ToastKind) -> u64 {
        self.toast_with_ttl(text, kind, DEFAULT_TOAST_TTL)
    }

    pub fn toast_with_ttl(&self, text: impl Into<String>, kind: ToastKind, ttl: Duration) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            text: text.into(),
            kind,
            ttl,
        };
        // A stopped renderer just means nobody is watching.
        let _ = self.tx.send(ToastCommand::Show(toast));
        id
    }

    pub fn success(&self, text: impl Into<String>) -> u64 {
        self.toast(text, ToastKind::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> u64 {
        self.toast(text, ToastKind::Error)
    }

    pub fn warning(&self, text: impl Into<String>) -> u64 {
        self.toast(text, ToastKind::Warning)
    }

    pub fn info(&self, text: impl Into<String>) -> u64 {
        self.toast(text, ToastKind::Info)
    }

    pub fn dismiss(&self, id: u64) {
        let _ = self.tx.send(ToastCommand::Dismiss(id));
    }
}

pub struct ToastRenderer {
    rx: mpsc::UnboundedReceiver<ToastCommand>,
    visible: watch::Sender<Vec<Toast>>,
}

impl ToastRenderer {
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.visible.subscribe()
    }

    /// Process commands until every `Toaster` is dropped.
    pub async fn run(mut self) {
        let mut timers: JoinSet<u64> = JoinSet::new();
        loop {
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(ToastCommand::Show(toast)) => {
                        let (id, ttl) = (toast.id, toast.ttl);
                        debug!("toast {id} [{}]: {}", toast.kind, toast.text);
                        self.visible.send_modify(|v| v.push(toast));
                        timers.spawn(async move {
                            tokio::time::sleep(ttl).await;
                            id
                        });
                    }
                    Some(ToastCommand::Dismiss(id)) => self.remove(id),
                    None => break,
                },
                Some(Ok(id)) = timers.join_next(), if !timers.is_empty() => self.remove(id),
            }
        }
        timers.abort_all();
    }

    fn remove(&self, id: u64) {
        self.visible.send_if_modified(|v| {
            let before = v.len();
            v.retain(|t| t.id != id);
            v.len() != before
        });
    }
}

/// Spawn a renderer on the current runtime and return its handle and view.
pub fn spawn_renderer() -> (Toaster, watch::Receiver<Vec<Toast>>) {
    let (toaster, renderer) = Toaster::channel();
    let view = renderer.subscribe();
    tokio::spawn(renderer.run());
    (toaster, view)
}
