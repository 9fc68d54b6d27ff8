use std::fmt::Write as _;
use std::time::Instant;

use catalog_api::{CatalogRecord, CoverSize};
use library_api::LibraryEntry;

use crate::app::{App, View};
use crate::notify::NoticeKind;

const NAV: [(View, &str); 3] = [
    (View::Finder, "/finder"),
    (View::Library, "/library"),
    (View::About, "/about"),
];

const ABOUT_TEXT: &str = "\
Book Finder helps readers, students and book enthusiasts search and discover books \
using data from the Open Library catalog.

Search by title, author, ISBN or subject, then save favorites to your personal \
library once you are signed in. Your session is kept between runs until you log out.";

/// Renders the current screen as plain text, ending with an input prompt.
pub fn render(app: &App, now: Instant) -> String {
    let mut out = String::new();
    render_header(app, &mut out);

    for notification in app.notifications.active(now) {
        let tag = match notification.kind {
            NoticeKind::Info => "info",
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", notification.text);
    }
    out.push('\n');

    match app.view {
        View::SignIn => render_auth(&mut out, "Sign in", "/signin <username> <password>", "/signup"),
        View::SignUp => render_auth(&mut out, "Sign up", "/signup <username> <password>", "/signin"),
        View::Finder => render_finder(app, &mut out),
        View::Library => render_library(app, &mut out),
        View::About => {
            let _ = writeln!(out, "About Book Finder\n\n{ABOUT_TEXT}");
        }
    }

    out.push_str("\n> ");
    out
}

fn render_header(app: &App, out: &mut String) {
    let nav = NAV
        .iter()
        .map(|(view, command)| {
            if *view == app.view {
                format!("[{command}]")
            } else {
                command.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let session = if app.signed_in {
        "signed in, /logout"
    } else {
        "signed out, /signin"
    };
    let _ = writeln!(out, "== {} == {nav} ({session})", app.view.title());
}

fn render_auth(out: &mut String, title: &str, usage: &str, alternative: &str) {
    let _ = writeln!(out, "{title}: {usage}");
    let _ = writeln!(out, "or {alternative} to switch. /search works without an account.");
}

fn render_finder(app: &App, out: &mut String) {
    let _ = writeln!(out, "Search by {} (/field to change)", app.field);
    if app.searching {
        let _ = writeln!(out, "Searching for \"{}\"...", app.query);
        return;
    }
    if app.results.is_empty() {
        return;
    }

    let _ = writeln!(out, "Results for \"{}\":", app.query);
    for (index, record) in app.results.iter().enumerate() {
        render_record(out, index + 1, record, app.is_saved(&record.key));
    }
    let _ = writeln!(out, "\n/save <n> to add a book to your library.");
}

fn render_record(out: &mut String, position: usize, record: &CatalogRecord, saved: bool) {
    let year = record
        .first_publish_year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let marker = if saved { " [saved]" } else { "" };
    let _ = writeln!(
        out,
        "{position:>2}. {} by {} (first published {year}){marker}",
        record.title,
        record.author_line()
    );
    if let Some(isbn) = record.primary_isbn() {
        let _ = writeln!(out, "    ISBN: {isbn}");
    }
    if let Some(cover) = record.cover_url(CoverSize::Medium) {
        let _ = writeln!(out, "    Cover: {cover}");
    }
}

fn render_library(app: &App, out: &mut String) {
    if !app.signed_in {
        let _ = writeln!(out, "Sign in to see your library.");
        return;
    }

    match &app.username {
        Some(username) => {
            let _ = writeln!(out, "{username}'s Library");
        }
        None => {
            let _ = writeln!(out, "My Library");
        }
    }

    if app.library.is_empty() {
        let _ = writeln!(out, "Your library is empty. /search for books to add.");
        return;
    }

    for (index, entry) in app.library.iter().enumerate() {
        render_entry(out, index + 1, entry);
    }
    let _ = writeln!(out, "\n/remove <n> to remove a book.");
}

fn render_entry(out: &mut String, position: usize, entry: &LibraryEntry) {
    let authors = if entry.authors.is_empty() {
        "Unknown Author".to_string()
    } else {
        entry.authors.join(", ")
    };
    let _ = write!(out, "{position:>2}. {} by {authors}", entry.title);
    if let Some(year) = entry.first_publish_year {
        let _ = write!(out, " ({year})");
    }
    out.push('\n');
}
