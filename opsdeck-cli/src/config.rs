//! Environment file loading
//!
//! `.env` in the current directory is read first, then `~/.opsdeck/.env`.
//! dotenvy never overwrites a variable that is already set, so the process
//! environment wins over both files and the current directory wins over home.

use std::path::PathBuf;

/// Directory holding the user-level `.env`
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".opsdeck"))
}

/// Load `.env` files, returning where values were loaded from.
///
/// Missing or unreadable files are skipped. Tracing is not initialised yet
/// when this runs, so nothing is logged here.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path);
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded_from.push(env_file);
        }
    }

    loaded_from
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_dotenv_doesnt_panic() {
        // No .env anywhere is fine
        let _ = load_dotenv();
    }

    #[test]
    fn config_dir_is_under_home() {
        if let (Some(dir), Some(home)) = (config_dir(), dirs::home_dir()) {
            assert_eq!(dir, home.join(".opsdeck"));
        }
    }
}
