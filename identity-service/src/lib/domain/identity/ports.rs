use async_trait::async_trait;

use crate::identity::errors::IdentityError;
use crate::identity::models::CreateOrganisationCommand;
use crate::identity::models::Organisation;
use crate::identity::models::OrganisationId;
use crate::identity::models::RegisterUserCommand;
use crate::identity::models::User;
use crate::identity::models::UserId;

/// Port for identity and membership service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new user together with their default organisation.
    ///
    /// Hashes the password and creates the user, the organisation named
    /// "<firstName>'s Organisation", and the membership link between them
    /// as a single atomic write.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, IdentityError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, IdentityError>;

    /// Retrieve user by email address.
    ///
    /// # Errors
    /// * `UserNotFoundByEmail` - No user with this email
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_email(&self, email: &str) -> Result<User, IdentityError>;

    /// List every organisation the user is a member of, in creation order.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_member_organisations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organisation>, IdentityError>;

    /// Retrieve an organisation, gated on the caller's membership.
    ///
    /// # Errors
    /// * `OrganisationNotFound` - Organisation does not exist
    /// * `AccessDenied` - Caller is not a member
    /// * `DatabaseError` - Database operation failed
    async fn get_organisation(
        &self,
        id: &OrganisationId,
        caller: &UserId,
    ) -> Result<Organisation, IdentityError>;

    /// Create an organisation with the owner as its first member.
    ///
    /// Creation and the owner's membership are a single atomic write.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create_organisation(
        &self,
        command: CreateOrganisationCommand,
        owner: &UserId,
    ) -> Result<Organisation, IdentityError>;

    /// Add a user to an organisation the caller is already a member of.
    ///
    /// Checks run in order: target user exists, organisation exists,
    /// caller is a member. Adding an existing member is a no-op success.
    ///
    /// # Errors
    /// * `UserNotFound` - Target user does not exist
    /// * `OrganisationNotFound` - Organisation does not exist
    /// * `AccessDenied` - Caller is not a member
    /// * `DatabaseError` - Database operation failed
    async fn add_member(
        &self,
        organisation_id: &OrganisationId,
        caller: &UserId,
        target: &UserId,
    ) -> Result<(), IdentityError>;
}

/// Persistence operations for users, organisations, and membership.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Persist a new user, their default organisation, and the membership
    /// link in one transaction; either all three exist afterwards or none.
    ///
    /// The store's unique constraint on email is the authoritative guard
    /// against duplicates.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email unique constraint violated
    /// * `DatabaseError` - Database operation failed
    async fn create_user_with_default_organisation(
        &self,
        user: User,
        organisation: Organisation,
    ) -> Result<User, IdentityError>;

    /// Retrieve user by identifier (None if not found).
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError>;

    /// Retrieve user by exact email match (None if not found).
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityError>;

    /// Persist a new organisation and its first member in one transaction.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create_organisation_with_member(
        &self,
        organisation: Organisation,
        member: &UserId,
    ) -> Result<Organisation, IdentityError>;

    /// Retrieve organisation by identifier (None if not found).
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_organisation_by_id(
        &self,
        id: &OrganisationId,
    ) -> Result<Option<Organisation>, IdentityError>;

    /// List the organisations a user belongs to, oldest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_organisations_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organisation>, IdentityError>;

    /// Check whether a user is a member of an organisation.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn is_member(
        &self,
        organisation_id: &OrganisationId,
        user_id: &UserId,
    ) -> Result<bool, IdentityError>;

    /// Add a membership link; adding an existing member changes nothing.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn add_member(
        &self,
        organisation_id: &OrganisationId,
        user_id: &UserId,
    ) -> Result<(), IdentityError>;
}
