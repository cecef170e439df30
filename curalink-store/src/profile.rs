//! Onboarding profiles and the account type marker.
use crate::json::JsonStore;
use crate::keys;
use curalink_common::{require_fields, AccountType, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub name: String,
    pub disease: String,
    pub location: String,
    #[serde(default)]
    pub additional_info: String,
}

impl PatientProfile {
    pub fn validate(&self) -> Result<()> {
        require_fields(&[
            ("name", self.name.as_str()),
            ("disease", self.disease.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherProfile {
    pub name: String,
    pub institution: String,
    pub specialties: String,
    pub research_interests: String,
    pub location: String,
    #[serde(default)]
    pub orcid: String,
}

impl ResearcherProfile {
    pub fn validate(&self) -> Result<()> {
        require_fields(&[
            ("name", self.name.as_str()),
            ("institution", self.institution.as_str()),
            ("specialties", self.specialties.as_str()),
            ("researchInterests", self.research_interests.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    Patient(PatientProfile),
    Researcher(ResearcherProfile),
}

impl Profile {
    pub fn account_type(&self) -> AccountType {
        match self {
            Profile::Patient(_) => AccountType::Patient,
            Profile::Researcher(_) => AccountType::Researcher,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Profile::Patient(p) => &p.name,
            Profile::Researcher(r) => &r.name,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Profile::Patient(p) => &p.location,
            Profile::Researcher(r) => &r.location,
        }
    }

    /// The condition or research interest used as search context.
    pub fn interest(&self) -> &str {
        match self {
            Profile::Patient(p) => &p.disease,
            Profile::Researcher(r) => &r.research_interests,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Profile::Patient(p) => p.validate(),
            Profile::Researcher(r) => r.validate(),
        }
    }

    fn data_key(account: AccountType) -> &'static str {
        match account {
            AccountType::Patient => keys::PATIENT_DATA,
            AccountType::Researcher => keys::RESEARCHER_DATA,
        }
    }
}

/// Persists the onboarding profile and account marker.
#[derive(Clone, Debug)]
pub struct ProfileStore {
    store: JsonStore,
}

impl ProfileStore {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// Validate and save `profile`, marking the device with its account type.
    ///
    /// Returns the previous account type when it differs from the new one, so
    /// callers can report a switch.
    pub async fn save(&self, profile: &Profile) -> Result<Option<AccountType>> {
        profile.validate()?;

        let account = profile.account_type();
        let previous = self.account_type().await?;

        match profile {
            Profile::Patient(p) => self.store.set_json(keys::PATIENT_DATA, p).await?,
            Profile::Researcher(r) => self.store.set_json(keys::RESEARCHER_DATA, r).await?,
        }
        self.store.set_json(keys::USER_TYPE, &account).await?;

        info!(%account, previous = ?previous, "profile.saved");
        Ok(previous.filter(|prev| *prev != account))
    }

    pub async fn account_type(&self) -> Result<Option<AccountType>> {
        self.store.get_json(keys::USER_TYPE).await
    }

    /// The profile for the current account type, if onboarding happened.
    pub async fn current(&self) -> Result<Option<Profile>> {
        let Some(account) = self.account_type().await? else {
            return Ok(None);
        };
        let key = Profile::data_key(account);
        let profile = match account {
            AccountType::Patient => self
                .store
                .get_json::<PatientProfile>(key)
                .await?
                .map(Profile::Patient),
            AccountType::Researcher => self
                .store
                .get_json::<ResearcherProfile>(key)
                .await?
                .map(Profile::Researcher),
        };
        Ok(profile)
    }

    /// Stable anonymous id for this device, created on first use.
    pub async fn ensure_user_id(&self) -> Result<String> {
        if let Some(id) = self.user_id().await? {
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        self.store.set_json(keys::USER_ID, &id).await?;
        Ok(id)
    }

    pub async fn user_id(&self) -> Result<Option<String>> {
        self.store.get_json(keys::USER_ID).await
    }
}
