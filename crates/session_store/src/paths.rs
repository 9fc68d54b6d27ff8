use std::path::{Path, PathBuf};

pub const SESSION_DIR: &str = ".bookfinder";
pub const SESSION_FILE_NAME: &str = "session.json";

#[must_use]
pub fn session_root(cwd: &Path) -> PathBuf {
    cwd.join(SESSION_DIR)
}

#[must_use]
pub fn default_session_path(cwd: &Path) -> PathBuf {
    session_root(cwd).join(SESSION_FILE_NAME)
}

pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| SESSION_FILE_NAME.into());
    file_name.push(".tmp");
    path.with_file_name(file_name)
}
