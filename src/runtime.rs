use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Instant;

use library_sync::{notice, CatalogSource, LibraryBackend, LibrarySync};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::app::{
    App, HostOps, Request, RequestFailure, RequestId, RequestKind, RequestOutcome,
    SessionSnapshot, View,
};
use crate::view::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEvent {
    pub request_id: RequestId,
    pub outcome: RequestOutcome,
}

struct TrackedRequest {
    view: View,
    kind: RequestKind,
    abort: AbortHandle,
}

/// Runs requests as local tasks and reports their outcomes on a channel.
///
/// Must be driven from inside a [`tokio::task::LocalSet`].
pub struct RuntimeHost<B, C> {
    sync: LibrarySync<B>,
    catalog: Rc<C>,
    events: mpsc::UnboundedSender<RequestEvent>,
    tracked: HashMap<RequestId, TrackedRequest>,
    next_request_id: RequestId,
    render_requested: bool,
    stop_requested: bool,
}

impl<B, C> RuntimeHost<B, C>
where
    B: LibraryBackend + 'static,
    C: CatalogSource + 'static,
{
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            signed_in: self.sync.session().is_authenticated(),
            entries: self.sync.entries(),
        }
    }

    fn cancel_all(&mut self) {
        for (_, tracked) in self.tracked.drain() {
            tracked.abort.abort();
        }
    }
}

impl<B, C> HostOps for RuntimeHost<B, C>
where
    B: LibraryBackend + 'static,
    C: CatalogSource + 'static,
{
    fn start_request(&mut self, view: View, request: Request) -> RequestId {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let kind = request.kind();
        let sync = self.sync.clone();
        let catalog = Rc::clone(&self.catalog);
        let events = self.events.clone();
        debug!(request_id, ?view, ?kind, "starting request");
        let handle = tokio::task::spawn_local(async move {
            let outcome = execute(request, &sync, catalog.as_ref()).await;
            let _ = events.send(RequestEvent {
                request_id,
                outcome,
            });
        });

        self.tracked.insert(
            request_id,
            TrackedRequest {
                view,
                kind,
                abort: handle.abort_handle(),
            },
        );
        request_id
    }

    fn cancel_request(&mut self, request_id: RequestId) {
        if let Some(tracked) = self.tracked.remove(&request_id) {
            debug!(request_id, "cancelling request");
            tracked.abort.abort();
        }
    }

    fn cancel_view(&mut self, view: View) {
        self.tracked.retain(|request_id, tracked| {
            if tracked.view != view || !tracked.kind.is_read() {
                return true;
            }
            debug!(request_id, ?view, "cancelling request of closed view");
            tracked.abort.abort();
            false
        });
    }

    fn logout(&mut self) -> Result<(), String> {
        self.sync.logout().map_err(|error| error.to_string())
    }

    fn request_render(&mut self) {
        self.render_requested = true;
    }

    fn request_stop(&mut self) {
        self.stop_requested = true;
    }
}

async fn execute<B, C>(request: Request, sync: &LibrarySync<B>, catalog: &C) -> RequestOutcome
where
    B: LibraryBackend,
    C: CatalogSource,
{
    let result = match request {
        Request::SignIn(credentials) => sync
            .sign_in(&credentials.username, &credentials.password)
            .await
            .map(|()| RequestOutcome::SignedIn),
        Request::SignUp(credentials) => sync
            .sign_up(&credentials.username, &credentials.password)
            .await
            .map(|()| RequestOutcome::SignedUp),
        Request::Search { query, field } => {
            return match catalog.search(&query, field).await {
                Ok(records) => RequestOutcome::SearchResults(records),
                Err(error) => {
                    debug!(%error, "catalog search failed");
                    RequestOutcome::Failed(RequestFailure::transport(notice::SEARCH_FAILED))
                }
            };
        }
        Request::LoadLibrary => sync.list_entries().await.map(RequestOutcome::Library),
        Request::LoadProfile => sync
            .profile()
            .await
            .map(|profile| RequestOutcome::Profile {
                username: profile.username,
            }),
        Request::Save(record) => sync
            .save_entry(&record)
            .await
            .map(|_| RequestOutcome::Saved {
                title: record.title,
            }),
        Request::Remove { id, title } => sync
            .remove_entry(&id)
            .await
            .map(|_| RequestOutcome::Removed { title }),
    };

    result.unwrap_or_else(|error| {
        debug!(%error, "request failed");
        RequestOutcome::Failed(RequestFailure::from(&error))
    })
}

/// Interactive shell: applies input lines and request outcomes to the [`App`]
/// and renders it after every change.
pub struct Runtime<B, C, W> {
    app: App,
    host: RuntimeHost<B, C>,
    events: mpsc::UnboundedReceiver<RequestEvent>,
    output: W,
}

impl<B, C, W> Runtime<B, C, W>
where
    B: LibraryBackend + 'static,
    C: CatalogSource + 'static,
    W: Write,
{
    pub fn new(app: App, sync: LibrarySync<B>, catalog: C, output: W) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        Self {
            app,
            host: RuntimeHost {
                sync,
                catalog: Rc::new(catalog),
                events: sender,
                tracked: HashMap::new(),
                next_request_id: 1,
                render_requested: false,
                stop_requested: false,
            },
            events,
            output,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn sync(&self) -> &LibrarySync<B> {
        &self.host.sync
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Requests started and not yet settled or cancelled.
    pub fn outstanding(&self) -> usize {
        self.host.tracked.len()
    }

    pub fn start(&mut self) -> io::Result<()> {
        self.app.on_start(&mut self.host);
        self.after_update()
    }

    pub fn submit(&mut self, line: &str) -> io::Result<()> {
        self.app.on_submit(line, &mut self.host);
        self.after_update()
    }

    /// Applies outcomes until no request is outstanding.
    pub async fn settle(&mut self) -> io::Result<()> {
        while !self.host.tracked.is_empty() {
            match self.events.recv().await {
                Some(event) => self.apply_event(event)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Reads commands from `input` until `/quit` or end of input.
    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.start()?;

        while !self.host.stop_requested {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => self.submit(&line)?,
                    None => {
                        self.app.on_quit(&mut self.host);
                        self.after_update()?;
                    }
                },
                Some(event) = self.events.recv() => self.apply_event(event)?,
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Cancels every outstanding request.
    pub fn shutdown(&mut self) {
        self.host.cancel_all();
    }

    fn apply_event(&mut self, event: RequestEvent) -> io::Result<()> {
        let RequestEvent {
            request_id,
            outcome,
        } = event;
        self.host.tracked.remove(&request_id);
        self.app
            .on_request_finished(request_id, outcome, &mut self.host);
        self.after_update()
    }

    fn after_update(&mut self) -> io::Result<()> {
        self.app.refresh(self.host.snapshot());
        if !std::mem::take(&mut self.host.render_requested) {
            return Ok(());
        }

        let frame = render(&self.app, Instant::now());
        self.output.write_all(frame.as_bytes())?;
        self.output.flush()
    }
}
