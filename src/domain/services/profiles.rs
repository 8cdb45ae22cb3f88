#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use chrono::Local;
use chrono::SecondsFormat;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::cache_dir;
use crate::domain::models::Identity;
use crate::domain::models::LocalProfile;
use crate::domain::models::UserProfile;

pub struct Profiles {
    pub cache_dir: path::PathBuf,
}

impl Default for Profiles {
    fn default() -> Profiles {
        return Profiles::new(cache_dir().join("profiles"));
    }
}

impl Profiles {
    pub fn new(cache_dir: path::PathBuf) -> Profiles {
        return Profiles { cache_dir };
    }

    fn get_file_path(&self, identity: &Identity) -> path::PathBuf {
        let file_name = identity
            .cache_key()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    return c;
                }
                return '_';
            })
            .collect::<String>();

        return self.cache_dir.join(format!("{file_name}.yaml"));
    }

    pub async fn load(&self, identity: &Identity) -> Result<Option<LocalProfile>> {
        let file_path = self.get_file_path(identity);
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path).await?;
        let profile: LocalProfile = serde_yaml::from_str(&payload)?;

        return Ok(Some(profile));
    }

    pub async fn set_name(&self, identity: &Identity, name: &str) -> Result<LocalProfile> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Name cannot be empty");
        }

        let profile = LocalProfile {
            principal: identity.cache_key(),
            name: name.to_string(),
            updated_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        };
        let payload = serde_yaml::to_string(&profile)?;

        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).await?;
        }

        let mut file = fs::File::create(self.get_file_path(identity)).await?;
        file.write_all(payload.as_bytes()).await?;

        return Ok(profile);
    }

    pub async fn delete(&self, identity: &Identity) -> Result<()> {
        let file_path = self.get_file_path(identity);
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path).await?;
        return Ok(());
    }

    /// Backend profile first, then the local one.
    pub async fn display_name(
        &self,
        identity: &Identity,
        backend_profile: Option<&UserProfile>,
    ) -> Result<Option<String>> {
        if let Some(profile) = backend_profile {
            if !profile.name.trim().is_empty() {
                return Ok(Some(profile.name.to_string()));
            }
        }

        let local = self.load(identity).await?;
        return Ok(local.map(|profile| return profile.name));
    }
}
