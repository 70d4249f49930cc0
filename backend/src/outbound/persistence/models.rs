//! Row and changeset structs mapping between Diesel and the domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::account::{
    ContactNumber, EmailAddress, FullName, ProfileChanges, UserAccount, UserId,
};
use crate::domain::asset::AssetRef;
use crate::domain::listing::{CarCategory, Listing, ListingChanges, ListingId};
use crate::domain::ports::{AccountRepositoryError, ListingRepositoryError};

use super::schema::{car_listings, users};

/// One row of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub contact_number: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserRow {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: *account.id.as_uuid(),
            full_name: account.full_name.as_ref().to_owned(),
            email: account.email.as_ref().to_owned(),
            password_hash: account.password_hash.clone(),
            contact_number: account
                .contact_number
                .as_ref()
                .map(|number| number.as_ref().to_owned()),
            profile_picture: account
                .profile_picture
                .as_ref()
                .map(|reference| reference.as_ref().to_owned()),
            created_at: account.created_at,
        }
    }
}

/// Convert a stored row back into the domain account.
///
/// Rows that no longer satisfy the domain invariants (edited out of band)
/// are reported as query failures rather than silently accepted.
pub fn row_to_account(row: UserRow) -> Result<UserAccount, AccountRepositoryError> {
    let corrupt =
        |column: &str| AccountRepositoryError::query(format!("corrupt user row: {column}"));
    Ok(UserAccount {
        id: UserId::from_uuid(row.id),
        full_name: FullName::new(row.full_name).map_err(|_| corrupt("full_name"))?,
        email: EmailAddress::new(row.email).map_err(|_| corrupt("email"))?,
        password_hash: row.password_hash,
        contact_number: row
            .contact_number
            .map(ContactNumber::new)
            .transpose()
            .map_err(|_| corrupt("contact_number"))?,
        profile_picture: row
            .profile_picture
            .map(AssetRef::new)
            .transpose()
            .map_err(|_| corrupt("profile_picture"))?,
        created_at: row.created_at,
    })
}

/// Partial update over the `users` table; `None` columns are skipped.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub full_name: Option<String>,
    pub contact_number: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<&ProfileChanges> for UserChangeset {
    fn from(changes: &ProfileChanges) -> Self {
        Self {
            full_name: changes.full_name.as_ref().map(|name| name.as_ref().to_owned()),
            contact_number: changes
                .contact_number
                .as_ref()
                .map(|number| number.as_ref().to_owned()),
            profile_picture: changes
                .profile_picture
                .as_ref()
                .map(|reference| reference.as_ref().to_owned()),
        }
    }
}

/// One row of the `car_listings` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = car_listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ListingRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub price: i64,
    pub year: i32,
    pub mileage: i64,
    pub fuel: String,
    pub transmission: String,
    pub category: String,
    pub make: String,
    pub model: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub featured: bool,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Listing> for ListingRow {
    fn from(listing: &Listing) -> Self {
        Self {
            id: *listing.id.as_uuid(),
            name: listing.name.clone(),
            location: listing.location.clone(),
            price: listing.price,
            year: listing.year,
            mileage: listing.mileage,
            fuel: listing.fuel.clone(),
            transmission: listing.transmission.clone(),
            category: listing.category.as_str().to_owned(),
            make: listing.make.clone(),
            model: listing.model.clone(),
            description: listing.description.clone(),
            images: listing
                .images
                .iter()
                .map(|reference| reference.as_ref().to_owned())
                .collect(),
            featured: listing.featured,
            seller_id: *listing.seller_id.as_uuid(),
            created_at: listing.created_at,
        }
    }
}

/// Convert a stored row back into the domain listing.
pub fn row_to_listing(row: ListingRow) -> Result<Listing, ListingRepositoryError> {
    let corrupt =
        |column: &str| ListingRepositoryError::query(format!("corrupt listing row: {column}"));
    let images = row
        .images
        .into_iter()
        .map(AssetRef::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| corrupt("images"))?;
    Ok(Listing {
        id: ListingId::from_uuid(row.id),
        name: row.name,
        location: row.location,
        price: row.price,
        year: row.year,
        mileage: row.mileage,
        fuel: row.fuel,
        transmission: row.transmission,
        category: CarCategory::parse(&row.category).map_err(|_| corrupt("category"))?,
        make: row.make,
        model: row.model,
        description: row.description,
        images,
        featured: row.featured,
        seller_id: UserId::from_uuid(row.seller_id),
        created_at: row.created_at,
    })
}

/// Partial update over the `car_listings` table; `None` columns are skipped.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = car_listings)]
pub struct ListingChangeset {
    pub name: Option<String>,
    pub location: Option<String>,
    pub price: Option<i64>,
    pub year: Option<i32>,
    pub mileage: Option<i64>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub category: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
}

impl From<&ListingChanges> for ListingChangeset {
    fn from(changes: &ListingChanges) -> Self {
        Self {
            name: changes.patch.name.clone(),
            location: changes.patch.location.clone(),
            price: changes.patch.price,
            year: changes.patch.year,
            mileage: changes.patch.mileage,
            fuel: changes.patch.fuel.clone(),
            transmission: changes.patch.transmission.clone(),
            category: changes
                .patch
                .category
                .map(|category| category.as_str().to_owned()),
            make: changes.patch.make.clone(),
            model: changes.patch.model.clone(),
            description: changes.patch.description.clone(),
            images: changes.images.as_ref().map(|references| {
                references
                    .iter()
                    .map(|reference| reference.as_ref().to_owned())
                    .collect()
            }),
            featured: changes.patch.featured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::{ListingDraft, ListingFields};

    fn listing() -> Listing {
        let draft = ListingDraft::new(ListingFields {
            name: "Kia Sportage AWD".into(),
            location: "Lahore".into(),
            price: 9_800_000,
            year: 2023,
            mileage: 12_000,
            fuel: "Petrol".into(),
            transmission: "Automatic".into(),
            category: "SUVs".into(),
            make: "Kia".into(),
            model: "Sportage".into(),
            description: Some("Company maintained".into()),
        })
        .expect("valid draft");
        Listing::from_draft(
            draft,
            UserId::random(),
            vec![AssetRef::managed("front.png"), AssetRef::managed("back.jpg")],
        )
    }

    #[test]
    fn listing_round_trips_through_its_row() {
        let original = listing();
        let row = ListingRow::from(&original);
        let restored = row_to_listing(row).expect("valid row");
        assert_eq!(restored, original);
    }

    #[test]
    fn corrupt_category_rows_are_reported() {
        let mut row = ListingRow::from(&listing());
        row.category = "Vans".into();
        assert!(row_to_listing(row).is_err());
    }

    #[test]
    fn changeset_skips_absent_fields() {
        let changes = ListingChanges::default();
        let changeset = ListingChangeset::from(&changes);
        assert!(changeset.name.is_none());
        assert!(changeset.images.is_none());
    }
}
