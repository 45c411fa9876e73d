use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use configparser::ini::Ini;
use tracing::info;

use crate::common::SessionCredential;
use crate::prompt::Prompt;

/// Shared AWS credential store (`~/.aws/credentials`).
///
/// The file is read as a whole, one profile section is upserted, and the
/// store is written back; unrelated sections and keys survive verbatim.
pub struct CredentialStore {
    path: PathBuf,
    ini: Ini,
}

impl CredentialStore {
    /// Opens the store at the default location
    pub fn open_default() -> Result<Self> {
        let path = dirs::home_dir()
            .map(|home| home.join(".aws").join("credentials"))
            .context("could not determine home directory")?;
        Self::open(path)
    }

    /// Opens (or prepares to create) the store at `path`
    pub fn open(path: PathBuf) -> Result<Self> {
        // Case-sensitive mode: profile names and the SDK's key names must
        // round-trip unchanged.
        let mut ini = Ini::new_cs();
        if path.exists() {
            ini.load(&path)
                .map_err(|e| anyhow!("failed to read credentials file: {e}"))?;
        }
        Ok(Self { path, ini })
    }

    /// Existing profile names
    pub fn profiles(&self) -> Vec<String> {
        self.ini.sections()
    }

    /// Writes one profile's temporary credentials, preserving the rest of
    /// the store
    pub fn upsert_profile(
        &mut self,
        profile: &str,
        role_arn: &str,
        credential: &SessionCredential,
    ) -> Result<()> {
        let expiration = credential
            .expires_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S (UTC%z)")
            .to_string();

        self.ini.set(profile, "role_arn", Some(role_arn.to_string()));
        self.ini.set(
            profile,
            "aws_access_key_id",
            Some(credential.access_key_id.clone()),
        );
        self.ini.set(
            profile,
            "aws_secret_access_key",
            Some(credential.secret_access_key.clone()),
        );
        self.ini.set(
            profile,
            "aws_session_token",
            Some(credential.session_token.clone()),
        );
        self.ini
            .set(profile, "aws_session_token_expiration", Some(expiration));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.ini
            .write(&self.path)
            .context("failed to write credentials file")?;

        info!("updated profile {} in {}", profile, self.path.display());
        Ok(())
    }
}

/// Prompts for the target profile and persists the credentials into it
pub fn persist_credentials(
    store: &mut CredentialStore,
    prompt: &dyn Prompt,
    role_arn: &str,
    credential: &SessionCredential,
) -> Result<String> {
    println!(
        "Found AWS profiles: {}",
        serde_json::to_string(&store.profiles())?
    );
    let profile = prompt.read_line("Enter profile name to add/update")?;
    store.upsert_profile(&profile, role_arn, credential)?;
    Ok(profile)
}
