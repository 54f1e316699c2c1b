//! Upload workflow: filter selected files, then drive each one through the
//! slot / transfer / register sequence on its own task.
//!
//! Tracked files live in an arena keyed by [`FileId`]. A task only ever
//! touches the record for its own id, so removal and updates can interleave
//! freely; updates for a removed id are dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use agentdesk_core::attachment::{is_accepted, ACCEPTED_EXTENSIONS};
use agentdesk_core::upload::{FileId, FileStatus, TransitionError, UploadedFile};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{AgentApi, FileHandle};

/// One status transition of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub id: FileId,
    pub name: String,
    pub status: FileStatus,
    pub attachment_id: Option<String>,
}

impl UploadEvent {
    fn from_file(file: &UploadedFile) -> Self {
        Self {
            id: file.id,
            name: file.name.clone(),
            status: file.status(),
            attachment_id: file.attachment_id().map(String::from),
        }
    }
}

#[derive(Default)]
struct TrackerState {
    next_id: u64,
    /// Ids are handed out in increasing order, so key order is selection order.
    files: BTreeMap<FileId, UploadedFile>,
    subscribers: Vec<mpsc::UnboundedSender<UploadEvent>>,
}

impl TrackerState {
    fn publish(&mut self, event: UploadEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Tracks selected files and their upload status.
#[derive(Clone)]
pub struct UploadTracker {
    api: Arc<dyn AgentApi>,
    state: Arc<Mutex<TrackerState>>,
}

impl UploadTracker {
    pub fn new(api: Arc<dyn AgentApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    pub fn accepted_types() -> &'static [&'static str] {
        ACCEPTED_EXTENSIONS
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Receive every status transition from now on, in the order applied.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<UploadEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }

    /// Snapshot of tracked files in selection order.
    pub fn files(&self) -> Vec<UploadedFile> {
        self.lock().files.values().cloned().collect()
    }

    pub fn get(&self, id: FileId) -> Option<UploadedFile> {
        self.lock().files.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().files.is_empty()
    }

    /// True while any tracked file has not reached a terminal status.
    pub fn is_busy(&self) -> bool {
        self.lock()
            .files
            .values()
            .any(|f| !f.status().is_terminal())
    }

    /// Attachment ids of every completed upload, in selection order.
    pub fn completed_attachment_ids(&self) -> Vec<String> {
        self.lock()
            .files
            .values()
            .filter(|f| f.status() == FileStatus::Completed)
            .filter_map(|f| f.attachment_id().map(String::from))
            .collect()
    }

    /// Stop tracking a file. In-flight requests for it are not cancelled.
    /// Returns false if the id was not tracked.
    pub fn remove(&self, id: FileId) -> bool {
        let removed = self.lock().files.remove(&id).is_some();
        if removed {
            debug!("stopped tracking upload {id}");
        }
        removed
    }

    /// Remove by display position. Out-of-range indexes are ignored.
    pub fn remove_at(&self, index: usize) -> Option<FileId> {
        let mut state = self.lock();
        let id = state.files.keys().nth(index).copied()?;
        state.files.remove(&id);
        Some(id)
    }

    /// Filter, track and spawn uploads, returning without waiting.
    /// Files with an unaccepted extension are dropped silently.
    pub fn start(&self, files: impl IntoIterator<Item = FileHandle>) -> UploadBatch {
        let accepted: Vec<(FileId, FileHandle)> = {
            let mut state = self.lock();
            let mut accepted = Vec::new();
            for file in files {
                if !is_accepted(file.name()) {
                    debug!("skipping unsupported file {}", file.name());
                    continue;
                }
                state.next_id += 1;
                let id = FileId(state.next_id);
                let record = UploadedFile::new(id, file.name(), file.size());
                let event = UploadEvent::from_file(&record);
                state.files.insert(id, record);
                state.publish(event);
                accepted.push((id, file));
            }
            accepted
        };

        let ids = accepted.iter().map(|(id, _)| *id).collect();
        let tasks = accepted
            .into_iter()
            .map(|(id, file)| {
                let tracker = self.clone();
                tokio::spawn(async move { tracker.run_upload(id, file).await })
            })
            .collect();
        UploadBatch { ids, tasks }
    }

    /// Filter, track and upload files, returning once every upload finished.
    pub async fn handle_files(&self, files: impl IntoIterator<Item = FileHandle>) -> Vec<FileId> {
        self.start(files).wait().await
    }

    async fn run_upload(&self, id: FileId, file: FileHandle) {
        self.apply(id, UploadedFile::begin);

        match self.api.upload_file(&file).await {
            Ok(attachment) => {
                info!("uploaded {} as attachment {}", file.name(), attachment.id);
                self.apply(id, |f| f.complete(attachment.id));
            }
            Err(e) => {
                error!("error uploading {}: {e}", file.name());
                self.apply(id, UploadedFile::fail);
            }
        }
    }

    /// Apply a transition to one record and publish the result.
    fn apply<F>(&self, id: FileId, transition: F)
    where
        F: FnOnce(&mut UploadedFile) -> Result<(), TransitionError>,
    {
        let mut state = self.lock();
        let Some(file) = state.files.get_mut(&id) else {
            debug!("upload {id} no longer tracked; dropping update");
            return;
        };
        if let Err(e) = transition(file) {
            warn!("upload {id}: {e}");
            return;
        }
        let event = UploadEvent::from_file(file);
        state.publish(event);
    }
}

/// Handle on the uploads spawned by one selection.
///
/// Dropping the batch detaches its uploads; they still run to a terminal
/// status.
pub struct UploadBatch {
    ids: Vec<FileId>,
    tasks: Vec<JoinHandle<()>>,
}

impl UploadBatch {
    /// Ids of the accepted files, in selection order.
    pub fn ids(&self) -> &[FileId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Wait for every upload in the batch to reach a terminal status.
    pub async fn wait(self) -> Vec<FileId> {
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("upload task failed: {e}");
            }
        }
        self.ids
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mock::{ApiCall, Endpoint, MockApi};

    fn tracker(api: &Arc<MockApi>) -> UploadTracker {
        UploadTracker::new(api.clone())
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<UploadEvent>) -> Vec<UploadEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn statuses_for(events: &[UploadEvent], id: FileId) -> Vec<FileStatus> {
        events
            .iter()
            .filter(|e| e.id == id)
            .map(|e| e.status)
            .collect()
    }

    #[tokio::test]
    async fn unsupported_extensions_are_never_tracked() {
        let api = Arc::new(MockApi::new());
        let t = tracker(&api);
        let ids = t
            .handle_files(vec![
                FileHandle::from_bytes("a.pdf", "pdf"),
                FileHandle::from_bytes("b.exe", "exe"),
            ])
            .await;

        assert_eq!(ids.len(), 1);
        let files = t.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.pdf");
        assert_eq!(api.count(Endpoint::RequestUploadSlot), 1);
    }

    #[tokio::test]
    async fn all_rejected_selection_does_nothing() {
        let api = Arc::new(MockApi::new());
        let t = tracker(&api);
        let batch = t.start(vec![FileHandle::from_bytes("virus.exe", "x")]);
        assert!(batch.is_empty());
        assert!(batch.wait().await.is_empty());
        assert!(t.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn successful_upload_walks_pending_uploading_completed() {
        let api = Arc::new(MockApi::new());
        let t = tracker(&api);
        let mut rx = t.subscribe();

        let ids = t
            .handle_files(vec![FileHandle::from_bytes("a.pdf", "content")])
            .await;
        let id = ids[0];

        let events = drain(&mut rx);
        assert_eq!(
            statuses_for(&events, id),
            vec![
                FileStatus::Pending,
                FileStatus::Uploading,
                FileStatus::Completed
            ]
        );
        let file = t.get(id).unwrap();
        assert_eq!(file.status(), FileStatus::Completed);
        assert_eq!(file.attachment_id(), Some("att-1"));
        assert_eq!(t.completed_attachment_ids(), vec!["att-1".to_string()]);

        let register = api
            .calls()
            .into_iter()
            .find_map(|c| match c {
                ApiCall::RegisterAttachment(input) => Some(input),
                _ => None,
            })
            .unwrap();
        assert_eq!(register.file_name, "a.pdf");
        assert_eq!(register.file_size, 7);
        assert_eq!(register.mime_type, "application/pdf");
        assert_eq!(register.key, "key-1");
    }

    #[tokio::test]
    async fn failed_transfer_marks_error_and_skips_registration() {
        let api = Arc::new(MockApi::new());
        api.fail_transfer_of(b"broken");
        let t = tracker(&api);
        let mut rx = t.subscribe();

        let ids = t
            .handle_files(vec![FileHandle::from_bytes("a.pdf", "broken")])
            .await;
        let id = ids[0];

        assert_eq!(
            statuses_for(&drain(&mut rx), id),
            vec![FileStatus::Pending, FileStatus::Uploading, FileStatus::Error]
        );
        let file = t.get(id).unwrap();
        assert_eq!(file.status(), FileStatus::Error);
        assert!(file.attachment_id().is_none());
        assert_eq!(api.count(Endpoint::TransferContent), 1);
        assert_eq!(api.count(Endpoint::RegisterAttachment), 0);
    }

    #[tokio::test]
    async fn failed_slot_request_marks_error() {
        let api = Arc::new(MockApi::new());
        api.fail(Endpoint::RequestUploadSlot);
        let t = tracker(&api);

        let ids = t
            .handle_files(vec![FileHandle::from_bytes("a.csv", "x,y")])
            .await;
        assert_eq!(t.get(ids[0]).unwrap().status(), FileStatus::Error);
        assert_eq!(api.count(Endpoint::TransferContent), 0);
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_siblings() {
        let api = Arc::new(MockApi::new());
        api.fail_transfer_of(b"bad");
        let t = tracker(&api);

        let ids = t
            .handle_files(vec![
                FileHandle::from_bytes("good.docx", "good"),
                FileHandle::from_bytes("bad.txt", "bad"),
                FileHandle::from_bytes("also-good.xlsx", "fine"),
            ])
            .await;

        let statuses: Vec<_> = ids
            .iter()
            .map(|id| t.get(*id).unwrap().status())
            .collect();
        assert_eq!(
            statuses,
            vec![
                FileStatus::Completed,
                FileStatus::Error,
                FileStatus::Completed
            ]
        );
        assert_eq!(t.completed_attachment_ids().len(), 2);
        assert!(!t.is_busy());
    }

    #[tokio::test]
    async fn uploads_run_concurrently() {
        let api = Arc::new(MockApi::new());
        let gate = api.gate_uploads();
        let t = tracker(&api);
        let mut rx = t.subscribe();

        let batch = t.start(vec![
            FileHandle::from_bytes("a.pdf", "a"),
            FileHandle::from_bytes("b.pdf", "b"),
        ]);

        // Both files reach uploading before either slot request is released.
        let mut uploading = 0;
        while uploading < 2 {
            let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            if ev.status == FileStatus::Uploading {
                uploading += 1;
            }
        }
        assert!(t.is_busy());

        gate.add_permits(2);
        let ids = batch.wait().await;
        for id in ids {
            assert_eq!(t.get(id).unwrap().status(), FileStatus::Completed);
        }
    }

    #[tokio::test]
    async fn removing_in_flight_file_keeps_others() {
        let api = Arc::new(MockApi::new());
        let gate = api.gate_uploads();
        let t = tracker(&api);

        let batch = t.start(vec![
            FileHandle::from_bytes("a.pdf", "a"),
            FileHandle::from_bytes("b.pdf", "b"),
        ]);
        let (first, second) = (batch.ids()[0], batch.ids()[1]);

        assert!(t.remove(first));
        gate.add_permits(2);
        batch.wait().await;

        assert!(t.get(first).is_none());
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(second).unwrap().status(), FileStatus::Completed);
        // The removed file's request still ran to completion.
        assert_eq!(api.count(Endpoint::RegisterAttachment), 2);
        assert_eq!(t.completed_attachment_ids().len(), 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let api = Arc::new(MockApi::new());
        let t = tracker(&api);
        let ids = t
            .handle_files(vec![
                FileHandle::from_bytes("a.pdf", "a"),
                FileHandle::from_bytes("b.txt", "b"),
            ])
            .await;

        assert!(t.remove(ids[0]));
        let before = t.files();
        assert!(!t.remove(ids[0]));
        assert_eq!(t.files(), before);

        assert_eq!(t.remove_at(5), None);
        assert_eq!(t.files(), before);
        assert_eq!(t.remove_at(0), Some(ids[1]));
        assert!(t.is_empty());
        assert_eq!(t.remove_at(0), None);
    }

    #[tokio::test]
    async fn ids_stay_stable_across_batches() {
        let api = Arc::new(MockApi::new());
        let t = tracker(&api);
        let first = t
            .handle_files(vec![FileHandle::from_bytes("a.pdf", "a")])
            .await;
        t.remove(first[0]);
        let second = t
            .handle_files(vec![FileHandle::from_bytes("a.pdf", "a")])
            .await;
        assert_ne!(first[0], second[0]);
        assert_eq!(t.files()[0].id, second[0]);
    }

    #[tokio::test]
    async fn dropped_batch_still_reaches_terminal_status() {
        let api = Arc::new(MockApi::new());
        let t = tracker(&api);
        let mut rx = t.subscribe();

        t.start(vec![FileHandle::from_bytes("a.pdf", "a")]);

        loop {
            let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            if ev.status.is_terminal() {
                break;
            }
        }
        assert_eq!(t.files()[0].status(), FileStatus::Completed);
        assert!(!t.is_busy());
        assert_eq!(api.count(Endpoint::RegisterAttachment), 1);
    }

    #[test]
    fn accepted_types_match_allow_list() {
        assert_eq!(
            UploadTracker::accepted_types(),
            &["pdf", "doc", "docx", "txt", "csv", "xlsx", "xls"]
        );
    }
}
