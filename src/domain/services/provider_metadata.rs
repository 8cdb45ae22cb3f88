#[cfg(test)]
#[path = "provider_metadata_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;

use super::Catalog;
use super::QueryCache;
use crate::domain::models::Actor;
use crate::domain::models::CustomProviderMetadata;
use crate::domain::models::ProviderInfo;

pub struct ProviderMetadataService {
    actor: Actor,
    cache: Arc<QueryCache>,
}

impl ProviderMetadataService {
    pub fn new(actor: Actor, cache: Arc<QueryCache>) -> ProviderMetadataService {
        return ProviderMetadataService { actor, cache };
    }

    fn cache_key(provider_id: &str) -> String {
        return QueryCache::key(&["customProviderMetadata", provider_id]);
    }

    pub async fn metadata(&self, provider_id: &str) -> Result<Option<CustomProviderMetadata>> {
        return self
            .cache
            .get_or_fetch(&ProviderMetadataService::cache_key(provider_id), || {
                return self.actor.get_custom_provider_metadata(provider_id);
            })
            .await;
    }

    /// Name shown for a provider. Custom slots can be renamed, everything else
    /// uses the catalog name, and unknown ids are shown as is.
    pub async fn resolve_display_name(&self, provider_id: &str) -> Result<String> {
        let provider = match Catalog::by_id(provider_id) {
            Some(provider) => provider,
            None => return Ok(provider_id.to_string()),
        };

        if provider.is_custom_slot {
            if let Some(metadata) = self.metadata(provider_id).await? {
                if !metadata.display_name.is_empty() {
                    return Ok(metadata.display_name);
                }
            }
        }

        return Ok(provider.display_name.to_string());
    }

    pub async fn rename_slot(&self, provider_id: &str, display_name: &str) -> Result<()> {
        match Catalog::by_id(provider_id) {
            Some(provider) if provider.is_custom_slot => {}
            _ => bail!(format!("{provider_id} is not a custom slot")),
        }

        let display_name = display_name.trim();
        if display_name.is_empty() {
            bail!("Display name cannot be empty");
        }

        self.actor
            .set_custom_provider_metadata(provider_id, display_name)
            .await?;
        self.cache
            .invalidate(&ProviderMetadataService::cache_key(provider_id));

        return Ok(());
    }

    /// Registers the compiled in catalog with the backend.
    pub async fn sync_catalog(&self) -> Result<usize> {
        let providers = Catalog::list()
            .iter()
            .map(Catalog::to_provider_info)
            .collect::<Vec<ProviderInfo>>();
        let count = providers.len();

        self.actor.initialize_providers(providers).await?;
        tracing::info!(count, "provider catalog synced");

        return Ok(count);
    }

    pub async fn registered(&self) -> Result<Vec<ProviderInfo>> {
        return self.actor.get_all_providers().await;
    }
}
