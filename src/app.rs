use std::collections::HashMap;
use std::time::{Duration, Instant};

use catalog_api::{CatalogRecord, SearchField};
use library_api::{Credentials, LibraryEntry};
use library_sync::{notice, validate_credentials, SyncError};
use tracing::debug;

use crate::commands::{parse_slash_command, CredentialArgs, SlashCommand, HELP_TEXT};
use crate::notify::Notifications;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    SignIn,
    SignUp,
    Finder,
    Library,
    About,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::SignUp => "Sign up",
            Self::Finder => "Book Finder",
            Self::Library => "My Library",
            Self::About => "About",
        }
    }
}

/// Work the app asks the host to run in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    SignIn(Credentials),
    SignUp(Credentials),
    Search { query: String, field: SearchField },
    LoadLibrary,
    LoadProfile,
    Save(CatalogRecord),
    Remove { id: String, title: String },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::SignIn(_) => RequestKind::SignIn,
            Self::SignUp(_) => RequestKind::SignUp,
            Self::Search { .. } => RequestKind::Search,
            Self::LoadLibrary => RequestKind::LoadLibrary,
            Self::LoadProfile => RequestKind::LoadProfile,
            Self::Save(_) => RequestKind::Save,
            Self::Remove { .. } => RequestKind::Remove,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    SignIn,
    SignUp,
    Search,
    LoadLibrary,
    LoadProfile,
    Save,
    Remove,
}

impl RequestKind {
    /// Backend reads without side effects. Closing a view aborts only these;
    /// other requests still settle, but their outcome is discarded.
    pub fn is_read(self) -> bool {
        matches!(self, Self::Search | Self::LoadLibrary | Self::LoadProfile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    SignedIn,
    SignedUp,
    SearchResults(Vec<CatalogRecord>),
    Library(Vec<LibraryEntry>),
    Profile { username: String },
    Saved { title: String },
    Removed { title: String },
    Failed(RequestFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Refused before anything was sent.
    Validation,
    SessionExpired,
    /// The backend answered with an error.
    Rejected,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: message.into(),
        }
    }
}

impl From<&SyncError> for RequestFailure {
    fn from(error: &SyncError) -> Self {
        let kind = match error {
            SyncError::SessionExpired => FailureKind::SessionExpired,
            SyncError::Rejected { .. } => FailureKind::Rejected,
            error if error.is_validation() => FailureKind::Validation,
            _ => FailureKind::Transport,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// Session and mirror state as held by the sync client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub signed_in: bool,
    pub entries: Vec<LibraryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRequest {
    view: View,
    kind: RequestKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub view: View,
    pub field: SearchField,
    pub query: String,
    pub results: Vec<CatalogRecord>,
    pub searching: bool,
    pub library: Vec<LibraryEntry>,
    pub username: Option<String>,
    pub signed_in: bool,
    pub notifications: Notifications,
    pub should_exit: bool,
    pending: HashMap<RequestId, PendingRequest>,
    latest_search: Option<RequestId>,
}

pub trait HostOps {
    /// Starts `request` on behalf of `view` and returns its id.
    fn start_request(&mut self, view: View, request: Request) -> RequestId;
    fn cancel_request(&mut self, request_id: RequestId);
    /// Cancels the outstanding reads owned by `view`.
    fn cancel_view(&mut self, view: View);
    fn logout(&mut self) -> Result<(), String>;
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

impl Default for App {
    fn default() -> Self {
        Self::new(false)
    }
}

impl App {
    pub fn new(signed_in: bool) -> Self {
        Self::with_notification_ttl(signed_in, crate::notify::DEFAULT_NOTIFICATION_TTL)
    }

    pub fn with_notification_ttl(signed_in: bool, ttl: Duration) -> Self {
        Self {
            view: if signed_in { View::Finder } else { View::SignIn },
            field: SearchField::default(),
            query: String::new(),
            results: Vec::new(),
            searching: false,
            library: Vec::new(),
            username: None,
            signed_in,
            notifications: Notifications::new(ttl),
            should_exit: false,
            pending: HashMap::new(),
            latest_search: None,
        }
    }

    /// Loads the data of the initial view.
    pub fn on_start(&mut self, host: &mut dyn HostOps) {
        self.load_view(host);
        host.request_render();
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.pending.contains_key(&request_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_saved(&self, key: &str) -> bool {
        self.library.iter().any(|entry| entry.key == key)
    }

    /// Adopts the session and mirror state after the host applied an update.
    pub fn refresh(&mut self, snapshot: SessionSnapshot) {
        self.signed_in = snapshot.signed_in;
        self.library = snapshot.entries;
        if !self.signed_in {
            self.username = None;
        }
    }

    pub fn on_submit(&mut self, line: &str, host: &mut dyn HostOps) {
        let line = line.trim();
        if line.is_empty() {
            host.request_render();
            return;
        }

        match parse_slash_command(line) {
            Some(command) => self.on_command(command, host),
            None => match self.view {
                View::Finder => self.search(line, host),
                View::SignIn => self
                    .notifications
                    .error("Use /signin <username> <password>, or /signup to register."),
                View::SignUp => self
                    .notifications
                    .error("Use /signup <username> <password>, or /signin if you have an account."),
                View::Library | View::About => self
                    .notifications
                    .error("Type /search <query> to find books, or /help for commands."),
            },
        }

        host.request_render();
    }

    fn on_command(&mut self, command: SlashCommand, host: &mut dyn HostOps) {
        match command {
            SlashCommand::SignIn(None) => self.navigate(View::SignIn, host),
            SlashCommand::SignIn(Some(args)) => self.authenticate(args, false, host),
            SlashCommand::SignUp(None) => self.navigate(View::SignUp, host),
            SlashCommand::SignUp(Some(args)) => self.authenticate(args, true, host),
            SlashCommand::Logout => self.logout(host),
            SlashCommand::Search(query) => {
                self.navigate(View::Finder, host);
                self.search(&query, host);
            }
            SlashCommand::Field(value) => match value.parse::<SearchField>() {
                Ok(field) => {
                    self.field = field;
                    self.notifications.info(format!("Searching by {field}."));
                }
                Err(error) => self.notifications.error(error.to_string()),
            },
            SlashCommand::Save(index) => self.save(index, host),
            SlashCommand::Remove(index) => self.remove(index, host),
            SlashCommand::Finder => self.navigate(View::Finder, host),
            SlashCommand::Library => self.navigate(View::Library, host),
            SlashCommand::About => self.navigate(View::About, host),
            SlashCommand::Help => self.notifications.info(HELP_TEXT),
            SlashCommand::Quit => self.on_quit(host),
            SlashCommand::Usage(usage) => self.notifications.error(format!("Usage: {usage}")),
            SlashCommand::Unknown(command) => self
                .notifications
                .error(format!("Unknown command: {command}")),
        }
    }

    fn authenticate(&mut self, args: CredentialArgs, sign_up: bool, host: &mut dyn HostOps) {
        let credentials = match validate_credentials(&args.username, &args.password) {
            Ok(credentials) => credentials,
            Err(error) => {
                self.notifications.error(error.to_string());
                return;
            }
        };

        let request = if sign_up {
            Request::SignUp(credentials)
        } else {
            Request::SignIn(credentials)
        };
        self.start(request, host);
    }

    fn logout(&mut self, host: &mut dyn HostOps) {
        if let Err(error) = host.logout() {
            self.notifications.error(error);
            return;
        }

        self.signed_in = false;
        self.library.clear();
        self.username = None;
        self.leave_view(host);
        self.view = View::SignIn;
        self.notifications.success(notice::SIGNED_OUT);
    }

    fn search(&mut self, query: &str, host: &mut dyn HostOps) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        if let Some(previous) = self.latest_search.take() {
            if self.pending.remove(&previous).is_some() {
                host.cancel_request(previous);
            }
        }

        self.query = query.to_string();
        self.results.clear();
        self.searching = true;
        let request_id = self.start(
            Request::Search {
                query: self.query.clone(),
                field: self.field,
            },
            host,
        );
        self.latest_search = Some(request_id);
    }

    fn save(&mut self, index: usize, host: &mut dyn HostOps) {
        if self.view != View::Finder {
            self.notifications
                .error("Search for books first, then /save <n> from the results.");
            return;
        }

        let Some(record) = index
            .checked_sub(1)
            .and_then(|position| self.results.get(position))
            .cloned()
        else {
            self.notifications
                .error(format!("No search result #{index}."));
            return;
        };
        self.start(Request::Save(record), host);
    }

    fn remove(&mut self, index: usize, host: &mut dyn HostOps) {
        if self.view != View::Library {
            self.notifications
                .error("Open your library with /library, then /remove <n>.");
            return;
        }

        let Some(entry) = index
            .checked_sub(1)
            .and_then(|position| self.library.get(position))
        else {
            self.notifications
                .error(format!("No library entry #{index}."));
            return;
        };
        let request = Request::Remove {
            id: entry.id.clone(),
            title: entry.title.clone(),
        };
        self.start(request, host);
    }

    /// Switches views. Leaving a view cancels its outstanding reads and
    /// discards every result still owed to it; entering a view (or
    /// re-entering the current one) reloads its data.
    pub fn navigate(&mut self, view: View, host: &mut dyn HostOps) {
        if view != self.view {
            self.leave_view(host);
            self.view = view;
        }
        self.load_view(host);
    }

    fn leave_view(&mut self, host: &mut dyn HostOps) {
        let view = self.view;
        host.cancel_view(view);
        self.pending.retain(|_, pending| pending.view != view);
        if view == View::Finder {
            self.results.clear();
            self.query.clear();
            self.searching = false;
            self.latest_search = None;
        }
    }

    fn load_view(&mut self, host: &mut dyn HostOps) {
        if !self.signed_in {
            return;
        }

        match self.view {
            View::Finder => {
                self.start(Request::LoadLibrary, host);
            }
            View::Library => {
                self.start(Request::LoadProfile, host);
                self.start(Request::LoadLibrary, host);
            }
            View::SignIn | View::SignUp | View::About => {}
        }
    }

    fn start(&mut self, request: Request, host: &mut dyn HostOps) -> RequestId {
        let kind = request.kind();
        let request_id = host.start_request(self.view, request);
        self.pending.insert(
            request_id,
            PendingRequest {
                view: self.view,
                kind,
            },
        );
        request_id
    }

    pub fn on_request_finished(
        &mut self,
        request_id: RequestId,
        outcome: RequestOutcome,
        host: &mut dyn HostOps,
    ) {
        let pending = self.pending.remove(&request_id);
        let latest_search = self.latest_search == Some(request_id);
        if latest_search {
            self.latest_search = None;
            self.searching = false;
        }

        if let RequestOutcome::Failed(failure) = &outcome {
            if failure.kind == FailureKind::SessionExpired {
                self.on_session_expired(host);
                host.request_render();
                return;
            }
        }

        let Some(pending) = pending else {
            debug!(request_id, "discarding result of an untracked request");
            return;
        };
        if pending.view != self.view {
            debug!(request_id, view = ?pending.view, "discarding result for a closed view");
            return;
        }
        if pending.kind == RequestKind::Search && !latest_search {
            debug!(request_id, "discarding superseded search");
            return;
        }

        match outcome {
            RequestOutcome::SignedIn => {
                self.signed_in = true;
                self.notifications.success(notice::SIGNED_IN);
                self.navigate(View::Finder, host);
            }
            RequestOutcome::SignedUp => {
                self.signed_in = true;
                self.notifications.success(notice::SIGNED_UP);
                self.navigate(View::Finder, host);
            }
            RequestOutcome::SearchResults(records) => {
                if records.is_empty() {
                    self.notifications.error(notice::NO_BOOKS_FOUND);
                }
                self.results = records;
            }
            RequestOutcome::Library(entries) => self.library = entries,
            RequestOutcome::Profile { username } => self.username = Some(username),
            RequestOutcome::Saved { title } => self
                .notifications
                .success(notice::added_to_library(&title)),
            RequestOutcome::Removed { title } => self
                .notifications
                .success(notice::removed_from_library(&title)),
            RequestOutcome::Failed(failure) => {
                if pending.kind == RequestKind::LoadProfile {
                    debug!(message = %failure.message, "profile unavailable");
                } else {
                    self.notifications.error(failure.message);
                }
            }
        }

        host.request_render();
    }

    /// Applied for every authorization failure, including ones that arrive
    /// after their view closed.
    fn on_session_expired(&mut self, host: &mut dyn HostOps) {
        self.signed_in = false;
        self.library.clear();
        self.username = None;

        let already_shown = self
            .notifications
            .active(Instant::now())
            .any(|notification| notification.text == notice::SESSION_EXPIRED);
        if !already_shown {
            self.notifications.error(notice::SESSION_EXPIRED);
        }

        if self.view != View::SignIn {
            self.leave_view(host);
            self.view = View::SignIn;
        }
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        self.should_exit = true;
        host.request_stop();
        host.request_render();
    }
}
