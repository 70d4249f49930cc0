//! Account lifecycle service: signup, login, profile management, password
//! change, and the cascading account deletion.
//!
//! The cascade is a best-effort sequence: listing images, listing documents,
//! the profile picture, and finally the user document. A failed sub-step is
//! logged and the remaining steps still run.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::account::{
    ContactNumber, EmailAddress, FullName, Password, ProfileChanges, UserAccount, UserId,
};
use super::asset::ImageUpload;
use super::error::Error;
use super::listing::Listing;
use super::ports::{
    AccountRepository, AccountRepositoryError, AssetStore, CredentialHasher, ListingRepository,
    ListingRepositoryError, TokenService,
};

/// Minimum password length accepted at signup.
pub const SIGNUP_PASSWORD_MIN: usize = 6;

/// Minimum password length accepted when changing an existing password.
/// Deliberately stricter than the signup threshold.
pub const CHANGE_PASSWORD_MIN: usize = 8;

/// Raw signup fields as they arrive at the boundary.
#[derive(Debug)]
pub struct SignupRequest {
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password in transit.
    pub password: Password,
    /// Optional contact number.
    pub contact_number: Option<String>,
}

/// Profile fields a caller may change in one request.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    /// Replacement full name.
    pub full_name: Option<String>,
    /// Replacement contact number.
    pub contact_number: Option<String>,
    /// Replacement profile picture upload.
    pub picture: Option<ImageUpload>,
}

impl ProfileUpdate {
    fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.contact_number.is_none() && self.picture.is_none()
    }
}

/// An account together with a freshly issued identity token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    /// The stored account.
    pub account: UserAccount,
    /// Signed identity token bound to it.
    pub token: String,
}

/// Orchestrates account mutations across credentials, tokens, storage, and
/// the listing repository (for the cascade).
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    listings: Arc<dyn ListingRepository>,
    assets: Arc<dyn AssetStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
}

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::DuplicateEmail { .. } => Error::conflict("email already exists"),
        AccountRepositoryError::Connection { message } => {
            error!(error = %message, "account repository unavailable");
            Error::service_unavailable(message)
        }
        AccountRepositoryError::Query { message } => {
            error!(error = %message, "account repository failure");
            Error::internal(message)
        }
    }
}

fn map_listing_error(error: ListingRepositoryError) -> Error {
    error!(error = %error, "listing repository failure");
    match error {
        ListingRepositoryError::Connection { message } => Error::service_unavailable(message),
        ListingRepositoryError::Query { message } => Error::internal(message),
    }
}

fn invalid_credentials() -> Error {
    // One message for unknown email and wrong password alike.
    Error::unauthorized("invalid credentials")
}

impl AccountService {
    /// Create the service over its five ports.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        listings: Arc<dyn ListingRepository>,
        assets: Arc<dyn AssetStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            accounts,
            listings,
            assets,
            hasher,
            tokens,
        }
    }

    /// Register a new account and issue its first token.
    ///
    /// The email uniqueness check and the insert are two steps; the narrow
    /// race between them is closed by the repository's unique index, which
    /// surfaces as the same conflict error.
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthenticatedAccount, Error> {
        let full_name = FullName::new(request.full_name).map_err(Error::from)?;
        let email = EmailAddress::new(request.email).map_err(Error::from)?;
        if request.password.len() < SIGNUP_PASSWORD_MIN {
            return Err(Error::invalid_field(
                "password",
                format!("password must be at least {SIGNUP_PASSWORD_MIN} characters"),
            ));
        }
        let contact_number = request
            .contact_number
            .map(ContactNumber::new)
            .transpose()
            .map_err(Error::from)?;

        if self
            .accounts
            .find_by_email(email.as_ref())
            .await
            .map_err(map_account_error)?
            .is_some()
        {
            return Err(Error::conflict("email already exists"));
        }

        let password_hash = self.hash_password(&request.password)?;
        let account = UserAccount {
            id: UserId::random(),
            full_name,
            email,
            password_hash,
            contact_number,
            profile_picture: None,
            created_at: chrono::Utc::now(),
        };
        self.accounts
            .insert(&account)
            .await
            .map_err(map_account_error)?;

        let token = self.issue_token(&account.id)?;
        info!(user = %account.id, "account created");
        Ok(AuthenticatedAccount { account, token })
    }

    /// Authenticate and issue a fresh token.
    pub async fn login(
        &self,
        email: String,
        password: Password,
    ) -> Result<AuthenticatedAccount, Error> {
        let email = EmailAddress::new(email).map_err(Error::from)?;
        let Some(account) = self
            .accounts
            .find_by_email(email.as_ref())
            .await
            .map_err(map_account_error)?
        else {
            return Err(invalid_credentials());
        };

        let verified = self
            .hasher
            .verify(&password, &account.password_hash)
            .map_err(|hash_error| {
                error!(error = %hash_error, "password verification failed");
                Error::internal("credential check failed")
            })?;
        if !verified {
            return Err(invalid_credentials());
        }

        let token = self.issue_token(&account.id)?;
        Ok(AuthenticatedAccount { account, token })
    }

    /// Fetch the caller's profile and their listings.
    pub async fn profile(&self, id: &UserId) -> Result<(UserAccount, Vec<Listing>), Error> {
        let account = self.fetch_account(id).await?;
        let listings = self
            .listings
            .find_by_seller(id)
            .await
            .map_err(map_listing_error)?;
        Ok((account, listings))
    }

    /// Apply profile changes for the caller.
    ///
    /// A replacement picture is saved before the old managed one is removed,
    /// so a crash in between leaves an orphaned file rather than a broken
    /// profile.
    pub async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserAccount, Error> {
        if update.is_empty() {
            return Err(Error::invalid_request("no recognised field supplied"));
        }
        let full_name = update
            .full_name
            .map(FullName::new)
            .transpose()
            .map_err(Error::from)?;
        let contact_number = update
            .contact_number
            .map(ContactNumber::new)
            .transpose()
            .map_err(Error::from)?;

        let account = self.fetch_account(id).await?;

        let profile_picture = match &update.picture {
            Some(upload) => Some(self.assets.save(upload).await.map_err(|save_error| {
                error!(error = %save_error, "profile picture store failed");
                Error::internal("failed to store profile picture")
            })?),
            None => None,
        };

        let changes = ProfileChanges {
            full_name,
            contact_number,
            profile_picture,
        };
        let updated = self
            .accounts
            .update_profile(id, &changes)
            .await
            .map_err(map_account_error)?;
        if !updated {
            return Err(Error::not_found("account not found"));
        }

        if changes.profile_picture.is_some() {
            self.remove_profile_picture(&account).await;
        }

        self.fetch_account(id).await
    }

    /// Re-verify the current password and store a hash of the new one.
    pub async fn change_password(
        &self,
        id: &UserId,
        current: Password,
        new: Password,
    ) -> Result<(), Error> {
        if new.len() < CHANGE_PASSWORD_MIN {
            return Err(Error::invalid_field(
                "newPassword",
                format!("new password must be at least {CHANGE_PASSWORD_MIN} characters"),
            ));
        }

        let account = self.fetch_account(id).await?;
        let verified = self
            .hasher
            .verify(&current, &account.password_hash)
            .map_err(|hash_error| {
                error!(error = %hash_error, "password verification failed");
                Error::internal("credential check failed")
            })?;
        if !verified {
            return Err(Error::unauthorized("current password is incorrect"));
        }

        let password_hash = self.hash_password(&new)?;
        let updated = self
            .accounts
            .update_password_hash(id, &password_hash)
            .await
            .map_err(map_account_error)?;
        if !updated {
            return Err(Error::not_found("account not found"));
        }
        Ok(())
    }

    /// Delete the caller's account, cascading over their listings and files.
    pub async fn delete_account(&self, id: &UserId) -> Result<(), Error> {
        let account = self.fetch_account(id).await?;

        // Step 1: listing images. Failures are logged and skipped.
        match self.listings.find_by_seller(id).await {
            Ok(listings) => {
                for listing in &listings {
                    self.purge_listing_images(listing).await;
                }
            }
            Err(lookup_error) => warn!(
                error = %lookup_error,
                user = %id,
                "could not enumerate listings for cascade; their files may be orphaned"
            ),
        }

        // Step 2: listing documents.
        match self.listings.delete_by_seller(id).await {
            Ok(removed) => info!(user = %id, removed, "listings removed in cascade"),
            Err(delete_error) => warn!(
                error = %delete_error,
                user = %id,
                "listing cascade delete failed; continuing"
            ),
        }

        // Step 3: profile picture.
        self.remove_profile_picture(&account).await;

        // Step 4: the user document itself. This one is not best-effort.
        let deleted = self
            .accounts
            .delete(id)
            .await
            .map_err(map_account_error)?;
        if !deleted {
            warn!(user = %id, "account document already gone during cascade");
        }
        info!(user = %id, "account deleted");
        Ok(())
    }

    async fn fetch_account(&self, id: &UserId) -> Result<UserAccount, Error> {
        self.accounts
            .find_by_id(id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }

    fn hash_password(&self, password: &Password) -> Result<String, Error> {
        self.hasher.hash(password).map_err(|hash_error| {
            error!(error = %hash_error, "password hashing failed");
            Error::internal("credential hashing failed")
        })
    }

    fn issue_token(&self, id: &UserId) -> Result<String, Error> {
        self.tokens.issue(id).map_err(|token_error| {
            error!(error = %token_error, "token issue failed");
            Error::internal("token issue failed")
        })
    }

    /// Delete every image a listing references, continuing past failures.
    async fn purge_listing_images(&self, listing: &Listing) {
        for reference in &listing.images {
            if let Err(delete_error) = self.assets.delete(reference).await {
                warn!(
                    error = %delete_error,
                    reference = %reference,
                    listing = %listing.id,
                    "cascade image deletion failed; continuing"
                );
            }
        }
    }

    /// Delete the stored profile picture when it is a managed asset.
    async fn remove_profile_picture(&self, account: &UserAccount) {
        let Some(reference) = &account.profile_picture else {
            return;
        };
        if !reference.is_managed() {
            return;
        }
        if let Err(delete_error) = self.assets.delete(reference).await {
            warn!(
                error = %delete_error,
                reference = %reference,
                user = %account.id,
                "profile picture deletion failed; continuing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::asset::AssetRef;
    use crate::domain::listing::{ListingDraft, ListingFields};
    use crate::domain::ports::{
        AssetStoreError, FixtureCredentialHasher, FixtureTokenService, MockAccountRepository,
        MockAssetStore, MockListingRepository,
    };
    use rstest::rstest;

    fn account_with(id: UserId, email: &str) -> UserAccount {
        UserAccount {
            id,
            full_name: FullName::new("Ayesha Khan").expect("valid name"),
            email: EmailAddress::new(email).expect("valid email"),
            password_hash: "plain:secret123".to_owned(),
            contact_number: None,
            profile_picture: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn listing_with_images(seller: UserId, count: usize) -> Listing {
        let draft = ListingDraft::new(ListingFields {
            name: "Toyota Yaris ATIV".into(),
            location: "Islamabad".into(),
            price: 4_400_000,
            year: 2022,
            mileage: 21_000,
            fuel: "Petrol".into(),
            transmission: "Automatic".into(),
            category: "Sedans".into(),
            make: "Toyota".into(),
            model: "Yaris".into(),
            description: None,
        })
        .expect("valid draft");
        let images = (0..count)
            .map(|index| AssetRef::managed(&format!("img-{index}.png")))
            .collect();
        Listing::from_draft(draft, seller, images)
    }

    fn service(
        accounts: MockAccountRepository,
        listings: MockListingRepository,
        assets: MockAssetStore,
    ) -> AccountService {
        AccountService::new(
            Arc::new(accounts),
            Arc::new(listings),
            Arc::new(assets),
            Arc::new(FixtureCredentialHasher),
            Arc::new(FixtureTokenService),
        )
    }

    fn password(raw: &str) -> Password {
        Password::new(raw).expect("valid password")
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            full_name: "Ayesha Khan".into(),
            email: "ayesha@example.test".into(),
            password: password("secret123"),
            contact_number: Some("03001234567".into()),
        }
    }

    #[tokio::test]
    async fn signup_hashes_the_password_and_issues_a_token() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().return_once(|_| Ok(None));
        accounts
            .expect_insert()
            .withf(|account| {
                account.password_hash == "plain:secret123"
                    && account.email.as_ref() == "ayesha@example.test"
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = service(accounts, MockListingRepository::new(), MockAssetStore::new());
        let authenticated = service.signup(signup_request()).await.expect("signed up");
        assert!(authenticated.token.starts_with("fixture-token:"));
        assert!(authenticated.account.profile_picture.is_none());
    }

    #[tokio::test]
    async fn signup_rejects_registered_emails() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().return_once(|email| {
            Ok(Some(account_with(UserId::random(), email)))
        });
        accounts.expect_insert().times(0);

        let service = service(accounts, MockListingRepository::new(), MockAssetStore::new());
        let error = service.signup(signup_request()).await.expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn signup_rejects_short_passwords_before_touching_storage() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().times(0);

        let service = service(accounts, MockListingRepository::new(), MockAssetStore::new());
        let error = service
            .signup(SignupRequest {
                password: password("five5"),
                ..signup_request()
            })
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case("bad-contact")]
    #[case("+9230012345")]
    #[tokio::test]
    async fn signup_rejects_malformed_contact_numbers(#[case] contact: &str) {
        let service = service(
            MockAccountRepository::new(),
            MockListingRepository::new(),
            MockAssetStore::new(),
        );
        let error = service
            .signup(SignupRequest {
                contact_number: Some(contact.into()),
                ..signup_request()
            })
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn login_does_not_reveal_whether_the_email_exists() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().returning(|email| {
            if email == "known@example.test" {
                Ok(Some(account_with(UserId::random(), email)))
            } else {
                Ok(None)
            }
        });

        let service = service(accounts, MockListingRepository::new(), MockAssetStore::new());
        let unknown = service
            .login("unknown@example.test".into(), password("whatever1"))
            .await
            .expect_err("rejected");
        let wrong = service
            .login("known@example.test".into(), password("wrongpass"))
            .await
            .expect_err("rejected");

        assert_eq!(unknown.code(), ErrorCode::Unauthorized);
        assert_eq!(unknown.message(), wrong.message());
    }

    #[tokio::test]
    async fn login_succeeds_with_the_stored_password() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .return_once(|email| Ok(Some(account_with(UserId::random(), email))));

        let service = service(accounts, MockListingRepository::new(), MockAssetStore::new());
        let authenticated = service
            .login("ayesha@example.test".into(), password("secret123"))
            .await
            .expect("logged in");
        assert!(!authenticated.token.is_empty());
    }

    #[tokio::test]
    async fn change_password_rejects_a_wrong_current_password() {
        let id = UserId::random();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(account_with(id, "a@b.test"))));
        accounts.expect_update_password_hash().times(0);

        let service = service(accounts, MockListingRepository::new(), MockAssetStore::new());
        let error = service
            .change_password(&id, password("not-the-one"), password("newpassword1"))
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn change_password_stores_the_new_hash() {
        let id = UserId::random();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(account_with(id, "a@b.test"))));
        accounts
            .expect_update_password_hash()
            .withf(|_, hash| hash == "plain:newpassword1")
            .times(1)
            .return_once(|_, _| Ok(true));

        let service = service(accounts, MockListingRepository::new(), MockAssetStore::new());
        service
            .change_password(&id, password("secret123"), password("newpassword1"))
            .await
            .expect("changed");
    }

    #[tokio::test]
    async fn change_password_enforces_the_stricter_minimum() {
        let service = service(
            MockAccountRepository::new(),
            MockListingRepository::new(),
            MockAssetStore::new(),
        );
        let error = service
            .change_password(&UserId::random(), password("secret123"), password("seven77"))
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_profile_requires_at_least_one_field() {
        let service = service(
            MockAccountRepository::new(),
            MockListingRepository::new(),
            MockAssetStore::new(),
        );
        let error = service
            .update_profile(&UserId::random(), ProfileUpdate::default())
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_profile_deletes_the_old_managed_picture_after_saving() {
        let id = UserId::random();
        let old_picture = AssetRef::managed("old.png");
        let mut stored = account_with(id, "a@b.test");
        stored.profile_picture = Some(old_picture.clone());
        let refreshed = {
            let mut account = stored.clone();
            account.profile_picture = Some(AssetRef::managed("new.png"));
            account
        };

        let mut accounts = MockAccountRepository::new();
        let mut lookups = 0u32;
        accounts.expect_find_by_id().times(2).returning(move |_| {
            lookups += 1;
            if lookups == 1 {
                Ok(Some(stored.clone()))
            } else {
                Ok(Some(refreshed.clone()))
            }
        });
        accounts
            .expect_update_profile()
            .withf(|_, changes| changes.profile_picture.is_some())
            .times(1)
            .return_once(|_, _| Ok(true));

        let mut assets = MockAssetStore::new();
        assets
            .expect_save()
            .times(1)
            .return_once(|_| Ok(AssetRef::managed("new.png")));
        assets
            .expect_delete()
            .withf(move |reference| *reference == old_picture)
            .times(1)
            .return_once(|_| Ok(true));

        let service = service(accounts, MockListingRepository::new(), assets);
        let update = ProfileUpdate {
            picture: Some(ImageUpload::new("avatar.png", vec![1, 2, 3]).expect("valid upload")),
            ..ProfileUpdate::default()
        };
        let account = service.update_profile(&id, update).await.expect("updated");
        assert_eq!(account.profile_picture, Some(AssetRef::managed("new.png")));
    }

    #[tokio::test]
    async fn update_profile_leaves_external_placeholder_pictures_alone() {
        let id = UserId::random();
        let mut stored = account_with(id, "a@b.test");
        stored.profile_picture =
            Some(AssetRef::new("https://example.test/avatar.png").expect("valid reference"));

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .times(2)
            .returning(move |_| Ok(Some(stored.clone())));
        accounts
            .expect_update_profile()
            .times(1)
            .return_once(|_, _| Ok(true));

        let mut assets = MockAssetStore::new();
        assets
            .expect_save()
            .return_once(|_| Ok(AssetRef::managed("new.png")));
        assets.expect_delete().times(0);

        let service = service(accounts, MockListingRepository::new(), assets);
        let update = ProfileUpdate {
            picture: Some(ImageUpload::new("avatar.png", vec![1]).expect("valid upload")),
            ..ProfileUpdate::default()
        };
        service.update_profile(&id, update).await.expect("updated");
    }

    #[tokio::test]
    async fn delete_account_cascades_over_listings_files_and_the_user() {
        let id = UserId::random();
        let mut stored = account_with(id, "a@b.test");
        stored.profile_picture = Some(AssetRef::managed("avatar.png"));

        let owned = vec![
            listing_with_images(id, 2),
            listing_with_images(id, 2),
            listing_with_images(id, 2),
        ];

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        accounts.expect_delete().times(1).return_once(|_| Ok(true));

        let mut listings = MockListingRepository::new();
        listings
            .expect_find_by_seller()
            .return_once(move |_| Ok(owned));
        listings
            .expect_delete_by_seller()
            .times(1)
            .return_once(|_| Ok(3));

        let mut assets = MockAssetStore::new();
        // Six listing images plus the profile picture.
        assets.expect_delete().times(7).returning(|_| Ok(true));

        let service = service(accounts, listings, assets);
        service.delete_account(&id).await.expect("deleted");
    }

    #[tokio::test]
    async fn delete_account_continues_when_a_file_deletion_fails() {
        let id = UserId::random();
        let stored = account_with(id, "a@b.test");
        let owned = vec![listing_with_images(id, 2)];

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        accounts.expect_delete().times(1).return_once(|_| Ok(true));

        let mut listings = MockListingRepository::new();
        listings
            .expect_find_by_seller()
            .return_once(move |_| Ok(owned));
        listings
            .expect_delete_by_seller()
            .times(1)
            .return_once(|_| Ok(1));

        let mut assets = MockAssetStore::new();
        let mut deletions = 0u32;
        assets.expect_delete().times(2).returning(move |_| {
            deletions += 1;
            if deletions == 1 {
                Err(AssetStoreError::delete("permission denied"))
            } else {
                Ok(true)
            }
        });

        let service = service(accounts, listings, assets);
        service.delete_account(&id).await.expect("deleted");
    }
}
