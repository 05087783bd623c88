use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::state::ensure_forecaster_home;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthState {
    pub openai_api_key: Option<String>,
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_forecaster_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    load_auth_from(&auth_path()?)
}

fn load_auth_from(p: &Path) -> Result<AuthState> {
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// The API key to use: `OPENAI_API_KEY` first, then `~/.forecaster/auth.json`.
pub fn resolve_api_key() -> Result<Option<String>> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Ok(Some(key.trim().to_string()));
        }
    }
    Ok(load_auth()?.openai_api_key.filter(|k| !k.trim().is_empty()))
}

fn prompt_secret(label: &str) -> Result<String> {
    // Plain stdin; the key is echoed.
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn check_openai_key(key: &str) -> Result<()> {
    if !key.starts_with("sk-") {
        bail!("key didn't look like an OpenAI API key (expected prefix sk-)");
    }
    Ok(())
}

pub fn openai_paste_api_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste OpenAI API key (starts with sk-)")?;
    check_openai_key(&key)?;
    auth.openai_api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved OpenAI API key to ~/.forecaster/auth.json");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_openai_key() {
        assert!(check_openai_key("sk-proj-abc").is_ok());
        assert!(check_openai_key("pk-abc").is_err());
        assert!(check_openai_key("").is_err());
    }

    #[test]
    fn test_load_auth_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let auth = load_auth_from(&dir.path().join("auth.json")).unwrap();
        assert_eq!(auth, AuthState::default());
    }

    #[test]
    fn test_load_auth_reads_key() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("auth.json");
        fs::write(&p, r#"{"openai_api_key": "sk-test"}"#).unwrap();
        let auth = load_auth_from(&p).unwrap();
        assert_eq!(auth.openai_api_key.as_deref(), Some("sk-test"));
    }
}
