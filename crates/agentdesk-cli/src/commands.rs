use std::path::PathBuf;
use std::sync::Arc;

use agentdesk_core::agent::{Agent, CallType};
use agentdesk_core::attachment::format_file_size;
use agentdesk_core::toast::Toast;
use agentdesk_core::upload::FileStatus;
use agentdesk_service::toast::spawn_renderer;
use agentdesk_service::{
    AgentApi, AgentEditor, FileHandle, HttpService, ReferenceLoader, Toaster, UploadEvent,
    UploadTracker,
};
use anyhow::{anyhow, bail, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::config::{AgentArgs, CallTargetArgs};

pub async fn reference(api: HttpService) -> Result<()> {
    let loader = ReferenceLoader::new(Arc::new(api));
    let state = loader.load().await;
    if let Some(error) = state.error {
        bail!(error);
    }
    let data = state.data;

    println!("LANGUAGES");
    for l in &data.languages {
        println!("  {:<12} {:<20} {}", l.id, l.name, l.code);
    }
    println!("VOICES");
    for v in &data.voices {
        println!("  {:<12} {:<20} {:<16} {}", v.id, v.name, v.tag, v.language);
    }
    println!("PROMPTS");
    for p in &data.prompts {
        println!("  {:<12} {:<20} {}", p.id, p.name, p.description);
    }
    println!("MODELS");
    for m in &data.models {
        println!("  {:<12} {:<20} {}", m.id, m.name, m.description);
    }
    println!("CALL TYPES");
    for c in CallType::ALL {
        println!("  {:<12} {}", c.as_str(), c.display_name());
    }
    Ok(())
}

pub async fn upload(api: HttpService, paths: &[PathBuf]) -> Result<()> {
    let tracker = UploadTracker::new(Arc::new(api));
    upload_with_progress(&tracker, paths).await?;

    let completed = print_summary(&tracker);
    let failed = tracker.len() - completed;
    if failed > 0 {
        bail!("{failed} upload(s) failed");
    }
    Ok(())
}

pub async fn save(api: HttpService, args: &AgentArgs) -> Result<()> {
    let (toaster, toasts) = spawn_renderer();
    let printer = print_toasts(toasts);
    let mut editor = editor_for(Arc::new(api), toaster, args);

    let outcome = match upload_attachments(&editor, &args.attachments).await {
        Ok(()) => match editor.save(false).await {
            Some(id) => Ok(id),
            None => Err(anyhow!(save_failure(&editor))),
        },
        Err(e) => Err(e),
    };

    // Dropping the editor drops the last toaster, which lets the printer drain and stop.
    drop(editor);
    let _ = printer.await;

    println!("{}", outcome?);
    Ok(())
}

pub async fn test_call(api: HttpService, args: &AgentArgs, target: &CallTargetArgs) -> Result<()> {
    let (toaster, toasts) = spawn_renderer();
    let printer = print_toasts(toasts);
    let mut editor = editor_for(Arc::new(api), toaster, args);
    editor.call_target = target.draft();

    let outcome = match upload_attachments(&editor, &args.attachments).await {
        Ok(()) => match editor.test_call().await {
            Some(resp) => Ok(format!(
                "call {} for agent {}: {}",
                resp.call_id, resp.agent_id, resp.status
            )),
            None if editor.show_test_call_validation() => {
                Err(anyhow!("a phone number is required for the test call"))
            }
            None if editor.agent_id().is_none() => Err(anyhow!(save_failure(&editor))),
            None => Err(anyhow!(editor
                .actions()
                .error()
                .unwrap_or_else(|| "test call was not initiated".into()))),
        },
        Err(e) => Err(e),
    };

    drop(editor);
    let _ = printer.await;

    println!("{}", outcome?);
    Ok(())
}

fn editor_for(api: Arc<dyn AgentApi>, toaster: Toaster, args: &AgentArgs) -> AgentEditor {
    let mut editor = match &args.id {
        Some(id) => AgentEditor::edit(
            api,
            toaster,
            &Agent {
                id: Some(id.clone()),
                ..Agent::default()
            },
        ),
        None => AgentEditor::create(api, toaster),
    };
    editor.draft = args.draft();
    editor
}

fn save_failure(editor: &AgentEditor) -> String {
    let missing = editor.draft.missing_fields();
    if !missing.is_empty() {
        let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
        return format!("missing required fields: {}", labels.join(", "));
    }
    editor
        .actions()
        .error()
        .unwrap_or_else(|| "agent was not saved".into())
}

async fn upload_attachments(editor: &AgentEditor, paths: &[PathBuf]) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    upload_with_progress(editor.uploads(), paths).await?;
    print_summary(editor.uploads());
    Ok(())
}

/// Run the upload workflow, printing every status transition as it happens.
async fn upload_with_progress(tracker: &UploadTracker, paths: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(FileHandle::from_path(path).await?);
    }

    let mut events = tracker.subscribe();
    let work = tracker.handle_files(files);
    tokio::pin!(work);
    loop {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event),
            _ = &mut work => break,
        }
    }
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    Ok(())
}

fn print_event(event: &UploadEvent) {
    match &event.attachment_id {
        Some(att) => eprintln!("{:<10} {} ({att})", event.status, event.name),
        None => eprintln!("{:<10} {}", event.status, event.name),
    }
}

/// Print one line per tracked file and return how many completed.
fn print_summary(tracker: &UploadTracker) -> usize {
    let files = tracker.files();
    if files.is_empty() {
        warn!(
            "no accepted files; supported types: {}",
            UploadTracker::accepted_types().join(", ")
        );
    }
    for file in &files {
        println!(
            "{:<10} {:<40} {:>10}  {}",
            file.status(),
            file.name,
            format_file_size(file.size),
            file.attachment_id().unwrap_or("-"),
        );
    }
    let completed = files
        .iter()
        .filter(|f| f.status() == FileStatus::Completed)
        .count();
    println!("{completed}/{} uploaded", files.len());
    completed
}

/// Echo each toast to stderr once, until the renderer shuts down.
fn print_toasts(mut view: watch::Receiver<Vec<Toast>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut shown = 0;
        while view.changed().await.is_ok() {
            let toasts = view.borrow_and_update().clone();
            for toast in toasts.iter().filter(|t| t.id > shown) {
                eprintln!("[{}] {}", toast.kind, toast.text);
            }
            shown = toasts.iter().map(|t| t.id).fold(shown, u64::max);
        }
    })
}
