use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::identity::errors::IdentityError;
use crate::identity::models::CreateOrganisationCommand;
use crate::identity::models::Organisation;
use crate::identity::models::OrganisationId;
use crate::identity::models::RegisterUserCommand;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::ports::IdentityRepository;
use crate::identity::ports::IdentityServicePort;

/// Domain service implementation for identity and membership operations.
///
/// Concrete implementation of IdentityServicePort with dependency injection.
pub struct IdentityService<R>
where
    R: IdentityRepository,
{
    repository: Arc<R>,
    password_hasher: auth::PasswordHasher,
}

impl<R> IdentityService<R>
where
    R: IdentityRepository,
{
    /// Create a new identity service with an injected repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<R> IdentityServicePort for IdentityService<R>
where
    R: IdentityRepository,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, IdentityError> {
        // Pre-check is an optimization only; the unique constraint in the
        // store remains the authoritative guard against a duplicate race.
        if self
            .repository
            .find_user_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(IdentityError::EmailAlreadyExists(command.email));
        }

        let password_hash = self.password_hasher.hash(&command.password)?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            password_hash,
            phone: command.phone,
            created_at: now,
        };
        let organisation = Organisation {
            id: OrganisationId::new(),
            name: format!("{}'s Organisation", user.first_name),
            description: None,
            created_at: now,
        };

        self.repository
            .create_user_with_default_organisation(user, organisation)
            .await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, IdentityError> {
        self.repository
            .find_user_by_id(id)
            .await?
            .ok_or(IdentityError::UserNotFound(id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, IdentityError> {
        self.repository
            .find_user_by_email(email)
            .await?
            .ok_or(IdentityError::UserNotFoundByEmail(email.to_string()))
    }

    async fn list_member_organisations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organisation>, IdentityError> {
        self.repository.list_organisations_for_member(user_id).await
    }

    async fn get_organisation(
        &self,
        id: &OrganisationId,
        caller: &UserId,
    ) -> Result<Organisation, IdentityError> {
        let organisation = self
            .repository
            .find_organisation_by_id(id)
            .await?
            .ok_or(IdentityError::OrganisationNotFound(id.to_string()))?;

        if !self.repository.is_member(id, caller).await? {
            return Err(IdentityError::AccessDenied);
        }

        Ok(organisation)
    }

    async fn create_organisation(
        &self,
        command: CreateOrganisationCommand,
        owner: &UserId,
    ) -> Result<Organisation, IdentityError> {
        let organisation = Organisation {
            id: OrganisationId::new(),
            name: command.name,
            description: command.description,
            created_at: Utc::now(),
        };

        self.repository
            .create_organisation_with_member(organisation, owner)
            .await
    }

    async fn add_member(
        &self,
        organisation_id: &OrganisationId,
        caller: &UserId,
        target: &UserId,
    ) -> Result<(), IdentityError> {
        if self.repository.find_user_by_id(target).await?.is_none() {
            return Err(IdentityError::UserNotFound(target.to_string()));
        }

        if self
            .repository
            .find_organisation_by_id(organisation_id)
            .await?
            .is_none()
        {
            return Err(IdentityError::OrganisationNotFound(
                organisation_id.to_string(),
            ));
        }

        // The caller, not the target, must already belong to the organisation
        if !self.repository.is_member(organisation_id, caller).await? {
            return Err(IdentityError::AccessDenied);
        }

        self.repository.add_member(organisation_id, target).await
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;

    mock! {
        pub TestIdentityRepository {}

        #[async_trait]
        impl IdentityRepository for TestIdentityRepository {
            async fn create_user_with_default_organisation(
                &self,
                user: User,
                organisation: Organisation,
            ) -> Result<User, IdentityError>;
            async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError>;
            async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityError>;
            async fn create_organisation_with_member(
                &self,
                organisation: Organisation,
                member: &UserId,
            ) -> Result<Organisation, IdentityError>;
            async fn find_organisation_by_id(
                &self,
                id: &OrganisationId,
            ) -> Result<Option<Organisation>, IdentityError>;
            async fn list_organisations_for_member(
                &self,
                user_id: &UserId,
            ) -> Result<Vec<Organisation>, IdentityError>;
            async fn is_member(
                &self,
                organisation_id: &OrganisationId,
                user_id: &UserId,
            ) -> Result<bool, IdentityError>;
            async fn add_member(
                &self,
                organisation_id: &OrganisationId,
                user_id: &UserId,
            ) -> Result<(), IdentityError>;
        }
    }

    fn register_command() -> RegisterUserCommand {
        RegisterUserCommand {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john@example.com".to_string(),
            password: "password123".to_string(),
            phone: Some("1234567890".to_string()),
        }
    }

    fn sample_user() -> User {
        User {
            id: UserId::new(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john@example.com".to_string(),
            password_hash: "$argon2id$test_hash".to_string(),
            phone: None,
            created_at: Utc::now(),
        }
    }

    fn sample_organisation() -> Organisation {
        Organisation {
            id: OrganisationId::new(),
            name: "John's Organisation".to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_user_hashes_password_and_creates_default_organisation() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_user_by_email()
            .withf(|email| email == "john@example.com")
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_create_user_with_default_organisation()
            .withf(|user, organisation| {
                user.first_name == "John"
                    && user.email == "john@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && organisation.name == "John's Organisation"
                    && organisation.description.is_none()
            })
            .times(1)
            .returning(|user, _| Ok(user));

        let service = IdentityService::new(Arc::new(repository));

        let user = service
            .register_user(register_command())
            .await
            .expect("Registration failed");

        assert_eq!(user.first_name, "John");
        assert_eq!(user.phone.as_deref(), Some("1234567890"));
        // Plaintext never survives registration
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_user_duplicate_email_pre_check() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_user_by_email()
            .times(1)
            .returning(|_| Ok(Some(sample_user())));

        repository
            .expect_create_user_with_default_organisation()
            .times(0);

        let service = IdentityService::new(Arc::new(repository));

        let result = service.register_user(register_command()).await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_register_user_duplicate_email_constraint_fallback() {
        let mut repository = MockTestIdentityRepository::new();

        // Pre-check misses the concurrent insert; the store constraint wins
        repository
            .expect_find_user_by_email()
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_create_user_with_default_organisation()
            .times(1)
            .returning(|user, _| Err(IdentityError::EmailAlreadyExists(user.email)));

        let service = IdentityService::new(Arc::new(repository));

        let result = service.register_user(register_command()).await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let mut repository = MockTestIdentityRepository::new();

        let user = sample_user();
        let user_id = user.id;
        let returned_user = user.clone();
        repository
            .expect_find_user_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        let service = IdentityService::new(Arc::new(repository));

        let found = service.get_user(&user_id).await.expect("User not found");
        assert_eq!(found.id, user_id);
        assert_eq!(found.email, "john@example.com");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_user_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = IdentityService::new(Arc::new(repository));

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result.unwrap_err(), IdentityError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_user_by_email_not_found() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_user_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = IdentityService::new(Arc::new(repository));

        let result = service.get_user_by_email("missing@example.com").await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::UserNotFoundByEmail(_)
        ));
    }

    #[tokio::test]
    async fn test_get_organisation_as_member() {
        let mut repository = MockTestIdentityRepository::new();

        let organisation = sample_organisation();
        let organisation_id = organisation.id;
        let caller = UserId::new();

        let returned = organisation.clone();
        repository
            .expect_find_organisation_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        repository
            .expect_is_member()
            .withf(move |org_id, user_id| *org_id == organisation_id && *user_id == caller)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = IdentityService::new(Arc::new(repository));

        let found = service
            .get_organisation(&organisation_id, &caller)
            .await
            .expect("Organisation not found");
        assert_eq!(found.name, "John's Organisation");
    }

    #[tokio::test]
    async fn test_get_organisation_as_non_member() {
        let mut repository = MockTestIdentityRepository::new();

        let organisation = sample_organisation();
        repository
            .expect_find_organisation_by_id()
            .times(1)
            .returning(move |_| Ok(Some(organisation.clone())));
        repository
            .expect_is_member()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = IdentityService::new(Arc::new(repository));

        let result = service
            .get_organisation(&OrganisationId::new(), &UserId::new())
            .await;
        assert!(matches!(result.unwrap_err(), IdentityError::AccessDenied));
    }

    #[tokio::test]
    async fn test_get_organisation_not_found() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_organisation_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_is_member().times(0);

        let service = IdentityService::new(Arc::new(repository));

        let result = service
            .get_organisation(&OrganisationId::new(), &UserId::new())
            .await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::OrganisationNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_create_organisation_adds_owner_as_member() {
        let mut repository = MockTestIdentityRepository::new();

        let owner = UserId::new();
        repository
            .expect_create_organisation_with_member()
            .withf(move |organisation, member| {
                organisation.name == "New Org"
                    && organisation.description.as_deref() == Some("Description")
                    && *member == owner
            })
            .times(1)
            .returning(|organisation, _| Ok(organisation));

        let service = IdentityService::new(Arc::new(repository));

        let command = CreateOrganisationCommand {
            name: "New Org".to_string(),
            description: Some("Description".to_string()),
        };

        let organisation = service
            .create_organisation(command, &owner)
            .await
            .expect("Creation failed");
        assert_eq!(organisation.name, "New Org");
    }

    #[tokio::test]
    async fn test_add_member_success() {
        let mut repository = MockTestIdentityRepository::new();

        let organisation = sample_organisation();
        let organisation_id = organisation.id;
        let caller = UserId::new();
        let target = UserId::new();

        repository
            .expect_find_user_by_id()
            .times(1)
            .returning(|_| Ok(Some(sample_user())));
        repository
            .expect_find_organisation_by_id()
            .times(1)
            .returning(move |_| Ok(Some(organisation.clone())));
        repository
            .expect_is_member()
            .withf(move |org_id, user_id| *org_id == organisation_id && *user_id == caller)
            .times(1)
            .returning(|_, _| Ok(true));
        repository
            .expect_add_member()
            .withf(move |org_id, user_id| *org_id == organisation_id && *user_id == target)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = IdentityService::new(Arc::new(repository));

        let result = service.add_member(&organisation_id, &caller, &target).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_add_member_unknown_target_checked_before_organisation() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_user_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_find_organisation_by_id().times(0);
        repository.expect_add_member().times(0);

        let service = IdentityService::new(Arc::new(repository));

        let result = service
            .add_member(&OrganisationId::new(), &UserId::new(), &UserId::new())
            .await;
        assert!(matches!(result.unwrap_err(), IdentityError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_add_member_caller_not_a_member() {
        let mut repository = MockTestIdentityRepository::new();

        let organisation = sample_organisation();
        repository
            .expect_find_user_by_id()
            .times(1)
            .returning(|_| Ok(Some(sample_user())));
        repository
            .expect_find_organisation_by_id()
            .times(1)
            .returning(move |_| Ok(Some(organisation.clone())));
        repository
            .expect_is_member()
            .times(1)
            .returning(|_, _| Ok(false));
        repository.expect_add_member().times(0);

        let service = IdentityService::new(Arc::new(repository));

        let result = service
            .add_member(&OrganisationId::new(), &UserId::new(), &UserId::new())
            .await;
        assert!(matches!(result.unwrap_err(), IdentityError::AccessDenied));
    }

    #[tokio::test]
    async fn test_add_member_organisation_not_found() {
        let mut repository = MockTestIdentityRepository::new();

        repository
            .expect_find_user_by_id()
            .times(1)
            .returning(|_| Ok(Some(sample_user())));
        repository
            .expect_find_organisation_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_is_member().times(0);

        let service = IdentityService::new(Arc::new(repository));

        let result = service
            .add_member(&OrganisationId::new(), &UserId::new(), &UserId::new())
            .await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::OrganisationNotFound(_)
        ));
    }
}
