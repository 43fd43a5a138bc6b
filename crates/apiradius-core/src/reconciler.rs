// ── Profile reconciler ──
//
// Maps the declarative profile lifecycle onto REST objects. Every call
// builds its own `RestObject` and drops it when done; the shared
// `ApiClient` carries the only long-lived state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use apiradius_api::{ApiClient, ObjectOptions, ReadOutcome, RestObject};

use crate::config::ProviderConfig;
use crate::error::CoreError;
use crate::model::address::collection_path;
use crate::model::{ProfileAddress, RadiusProfile};

/// What is known about a profile after a successful operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileState {
    /// Composite external id, `operator/profile`.
    pub address: ProfileAddress,
    pub profile: RadiusProfile,
    /// Raw create response body; only set right after a create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_response: Option<String>,
}

/// CRUD for RADIUS profiles of one operator.
#[derive(Debug, Clone)]
pub struct ProfileReconciler {
    client: Arc<ApiClient>,
    operator: String,
    id_attribute: Option<String>,
    copy_keys: Vec<String>,
}

impl ProfileReconciler {
    pub fn new(client: Arc<ApiClient>, operator: impl Into<String>) -> Self {
        Self {
            client,
            operator: operator.into(),
            id_attribute: None,
            copy_keys: Vec::new(),
        }
    }

    /// Reconciler using the provider's operator, id attribute and copy keys.
    pub fn from_config(client: Arc<ApiClient>, config: &ProviderConfig) -> Self {
        Self {
            client,
            operator: config.operator.clone(),
            id_attribute: config.id_attribute.clone(),
            copy_keys: config.copy_keys.clone(),
        }
    }

    pub fn with_copy_keys(mut self, keys: Vec<String>) -> Self {
        self.copy_keys = keys;
        self
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Address of `profile_id` under this reconciler's operator.
    pub fn address(&self, profile_id: &str) -> Result<ProfileAddress, CoreError> {
        ProfileAddress::new(self.operator.clone(), profile_id)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    #[instrument(skip_all, fields(profile = %profile.id))]
    pub async fn create(&self, profile: &RadiusProfile) -> Result<ProfileState, CoreError> {
        profile.validate()?;
        let address = self.address(&profile.id)?;
        let payload = profile.to_payload()?;

        let mut obj = RestObject::new(&self.client, self.options(&address));
        obj.create(payload).await?;
        let create_response = obj.create_response().map(str::to_owned);
        info!(%address, "profile created");

        let mut state = self.read_back(&address, "create").await?;
        state.create_response = create_response;
        Ok(state)
    }

    /// Current remote state, or `None` when the profile does not exist.
    #[instrument(skip_all, fields(address = %address))]
    pub async fn read(&self, address: &ProfileAddress) -> Result<Option<ProfileState>, CoreError> {
        let mut obj = RestObject::new(&self.client, self.options(address));
        match obj.read().await? {
            ReadOutcome::Found(doc) => Ok(Some(ProfileState {
                address: address.clone(),
                profile: RadiusProfile::from_document(doc)?,
                create_response: None,
            })),
            ReadOutcome::Absent => {
                debug!("profile is gone");
                Ok(None)
            }
        }
    }

    #[instrument(skip_all, fields(profile = %profile.id))]
    pub async fn update(&self, profile: &RadiusProfile) -> Result<ProfileState, CoreError> {
        profile.validate()?;
        let address = self.address(&profile.id)?;
        let payload = profile.to_payload()?;

        let mut obj = RestObject::new(&self.client, self.options(&address));
        obj.update(payload).await?;
        info!(%address, "profile updated");

        self.read_back(&address, "update").await
    }

    /// Delete the profile. Deleting an absent profile succeeds.
    #[instrument(skip_all, fields(address = %address))]
    pub async fn delete(&self, address: &ProfileAddress) -> Result<(), CoreError> {
        let mut obj = RestObject::new(&self.client, self.options(address));
        obj.delete().await?;
        info!("profile deleted");
        Ok(())
    }

    pub async fn exists(&self, address: &ProfileAddress) -> Result<bool, CoreError> {
        let mut obj = RestObject::new(&self.client, self.options(address));
        Ok(obj.exists().await?)
    }

    /// Adopt an existing profile by its composite id (`operator/profile`).
    pub async fn import(&self, composite_id: &str) -> Result<ProfileState, CoreError> {
        let address: ProfileAddress = composite_id.parse()?;
        self.read(&address).await?.ok_or_else(|| CoreError::NotFound {
            entity_type: "profile".into(),
            identifier: address.to_string(),
        })
    }

    // ── Internals ────────────────────────────────────────────────────

    fn options(&self, address: &ProfileAddress) -> ObjectOptions {
        let mut opts = ObjectOptions::new(collection_path(&address.operator))
            .with_id(address.profile.clone())
            .with_copy_keys(self.copy_keys.clone());
        if let Some(attr) = &self.id_attribute {
            opts = opts.with_id_attribute(attr.clone());
        }
        opts
    }

    async fn read_back(
        &self,
        address: &ProfileAddress,
        after: &str,
    ) -> Result<ProfileState, CoreError> {
        self.read(address).await?.ok_or_else(|| CoreError::NotFound {
            entity_type: "profile".into(),
            identifier: format!("{address} (absent right after {after})"),
        })
    }
}
