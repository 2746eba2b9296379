//! User profiles, one document per signed-in identity.

use std::sync::Arc;

use futures_util::stream::BoxStream;
use paymate_core::leave::LeaveBalance;
use paymate_core::types::UserProfile;
use tracing::info;

use crate::error::DbResult;
use crate::store::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    profiles: Collection<UserProfile>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        ProfileRepository {
            profiles: Collection::new(store),
        }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<UserProfile>> {
        self.profiles.get(id).await
    }

    pub async fn require(&self, id: &str) -> DbResult<UserProfile> {
        self.profiles.require(id).await
    }

    pub async fn save(&self, profile: &UserProfile) -> DbResult<()> {
        self.profiles.put(profile).await
    }

    /// Returns the stored profile, creating the default one on first sight
    /// of `id`.
    pub async fn ensure(
        &self,
        id: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<UserProfile> {
        if let Some(existing) = self.profiles.get(id).await? {
            return Ok(existing);
        }

        let profile = UserProfile::new_default(id, display_name, email);
        info!(id = %id, name = %profile.name, "Creating default profile");
        self.profiles.put(&profile).await?;
        Ok(profile)
    }

    /// Replaces the stored leave balance.
    pub async fn update_balance(&self, id: &str, balance: LeaveBalance) -> DbResult<UserProfile> {
        let mut profile = self.profiles.require(id).await?;
        profile.balance = Some(balance);
        self.profiles.put(&profile).await?;
        Ok(profile)
    }

    /// Live profile; `None` until the document exists.
    pub fn watch(&self, id: &str) -> BoxStream<'static, DbResult<Option<UserProfile>>> {
        self.profiles.watch(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use paymate_core::types::PlanType;

    fn repo() -> ProfileRepository {
        ProfileRepository::new(Arc::new(MemoryDocumentStore::default()))
    }

    #[tokio::test]
    async fn test_ensure_creates_once() {
        let profiles = repo();

        let created = profiles.ensure("uid-1", None, Some("a@b.co")).await.unwrap();
        assert_eq!(created.name, "New User");
        assert_eq!(created.plan, PlanType::Free);

        let mut edited = created.clone();
        edited.company = "Acme".to_string();
        profiles.save(&edited).await.unwrap();

        let again = profiles.ensure("uid-1", Some("Other"), None).await.unwrap();
        assert_eq!(again.company, "Acme");
        assert_eq!(again.name, "New User");
    }

    #[tokio::test]
    async fn test_update_balance() {
        let profiles = repo();
        profiles.ensure("uid-1", Some("Ravi"), None).await.unwrap();

        let balance = LeaveBalance {
            cl: 5,
            ..LeaveBalance::default()
        };
        let updated = profiles.update_balance("uid-1", balance).await.unwrap();
        assert_eq!(updated.leave_balance().cl, 5);

        assert!(profiles.update_balance("nobody", balance).await.is_err());
    }
}
