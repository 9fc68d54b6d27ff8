#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// `/signin` with no arguments opens the sign-in view.
    SignIn(Option<CredentialArgs>),
    SignUp(Option<CredentialArgs>),
    Logout,
    Search(String),
    Field(String),
    Save(usize),
    Remove(usize),
    Finder,
    Library,
    About,
    Help,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialArgs {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialArgs")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

pub const HELP_TEXT: &str = "Commands: /signin <user> <password>, /signup <user> <password>, /logout, \
/search <query>, /field <title|author|isbn|subject>, /save <n>, /library, /remove <n>, \
/finder, /about, /help, /quit";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    let parsed = match command {
        "/signin" | "/login" => SlashCommand::SignIn(credential_args(rest)),
        "/signup" | "/register" => SlashCommand::SignUp(credential_args(rest)),
        "/logout" => SlashCommand::Logout,
        "/search" => SlashCommand::Search(rest.to_string()),
        "/field" | "/filter" => {
            if rest.is_empty() {
                SlashCommand::Usage("/field <title|author|isbn|subject>")
            } else {
                SlashCommand::Field(rest.to_string())
            }
        }
        "/save" => parse_index(rest)
            .map(SlashCommand::Save)
            .unwrap_or(SlashCommand::Usage("/save <n>")),
        "/remove" => parse_index(rest)
            .map(SlashCommand::Remove)
            .unwrap_or(SlashCommand::Usage("/remove <n>")),
        "/finder" | "/home" => SlashCommand::Finder,
        "/library" => SlashCommand::Library,
        "/about" => SlashCommand::About,
        "/help" => SlashCommand::Help,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}

/// Splits `<user> <password>`. Missing parts become empty strings so the
/// sign-in flow can report them; no arguments at all means "open the view".
fn credential_args(rest: &str) -> Option<CredentialArgs> {
    if rest.is_empty() {
        return None;
    }

    let (username, password) = match rest.split_once(char::is_whitespace) {
        Some((username, password)) => (username, password.trim()),
        None => (rest, ""),
    };

    Some(CredentialArgs {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// One-based index as typed by the user.
fn parse_index(rest: &str) -> Option<usize> {
    rest.parse::<usize>().ok().filter(|index| *index > 0)
}
