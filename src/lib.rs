//! Terminal book discovery client.
//!
//! Search the public catalog, sign in against the library backend, and keep
//! a personal library of saved books. The shell is line-oriented: plain text
//! searches from the finder view and `/commands` do everything else (see
//! [`commands::HELP_TEXT`]).
//!
//! Requests run as local tasks owned by the view that issued them. Leaving a
//! view aborts its reads; saves, removals and sign-ins still reach the
//! backend, but results for requests the app no longer tracks are dropped.
//! An authorization failure signs the user out wherever it lands.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod notify;
pub mod runtime;
pub mod view;
