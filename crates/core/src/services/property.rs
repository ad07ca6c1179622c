//! Property listings.

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use stayhub_common::{AppError, AppResult, IdGenerator};
use stayhub_db::{
    entities::{
        property,
        user::{self, Role},
    },
    repositories::{BrowseFilter, PropertyRepository, UserRepository},
};
use validator::Validate;

use crate::services::access::{Capability, has_capability, require_capability, require_host};
use crate::services::admin_user::MAX_PAGE_SIZE;
use crate::services::notification::{NotificationService, dispatch_best_effort};

/// Street location of a listing, stored as a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[validate(length(max = 256))]
    pub address: String,
    #[validate(length(min = 1, max = 128))]
    pub city: String,
    #[validate(length(max = 128))]
    pub state: String,
    #[validate(length(min = 1, max = 128))]
    pub country: String,
    #[validate(length(max = 16))]
    pub zip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Input for creating a listing.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 64))]
    pub property_type: String,

    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub bedrooms: i32,

    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub bathrooms: i32,

    #[validate(range(min = 1, max = 100))]
    pub max_guests: i32,

    #[validate(range(min = 0))]
    pub price_per_night: i64,

    /// Image URLs.
    #[validate(length(max = 50))]
    #[serde(default)]
    pub images: Vec<String>,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub amenities: Vec<String>,

    #[validate(nested)]
    pub location: Location,

    /// Host to list under; only admins may set it.
    pub host_id: Option<String>,
}

/// Input for editing a listing's content.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub property_type: Option<String>,

    #[validate(range(min = 0, max = 100))]
    pub bedrooms: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub bathrooms: Option<i32>,

    #[validate(range(min = 1, max = 100))]
    pub max_guests: Option<i32>,

    #[validate(range(min = 0))]
    pub price_per_night: Option<i64>,

    #[validate(length(max = 50))]
    pub images: Option<Vec<String>>,

    #[validate(length(max = 100))]
    pub amenities: Option<Vec<String>>,

    #[validate(nested)]
    pub location: Option<Location>,
}

/// Property service.
#[derive(Clone)]
pub struct PropertyService {
    property_repo: PropertyRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl PropertyService {
    /// Create a new property service.
    #[must_use]
    pub const fn new(
        property_repo: PropertyRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            property_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a listing.
    ///
    /// Admin-created listings go live at once; a host's listing waits for approval.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreatePropertyInput,
    ) -> AppResult<property::Model> {
        input.validate()?;
        require_host(actor)?;

        let is_admin = actor.role == Role::Admin;
        let host = match input.host_id.as_deref() {
            Some(host_id) if host_id != actor.id => {
                if !is_admin {
                    return Err(AppError::Forbidden(
                        "Only admins can list for another host".to_string(),
                    ));
                }
                let host = self.user_repo.get_by_id(host_id).await?;
                if !matches!(host.role, Role::Host | Role::Admin) {
                    return Err(AppError::Validation(
                        "Listings can only be assigned to a host or admin".to_string(),
                    ));
                }
                host
            }
            _ => actor.clone(),
        };

        let id = self.id_gen.generate();
        let model = property::ActiveModel {
            id: Set(id.clone()),
            title: Set(input.title.trim().to_string()),
            slug: Set(slug_for(&input.title, &id)),
            description: Set(input.description),
            property_type: Set(input.property_type),
            bedrooms: Set(input.bedrooms),
            bathrooms: Set(input.bathrooms),
            max_guests: Set(input.max_guests),
            price_per_night: Set(input.price_per_night),
            images: Set(serde_json::json!(input.images)),
            amenities: Set(serde_json::json!(input.amenities)),
            location: Set(to_json(&input.location)?),
            host_id: Set(host.id.clone()),
            is_active: Set(is_admin),
            is_approved_by_admin: Set(is_admin),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };
        let property = self.property_repo.create(model).await?;

        tracing::info!(property_id = %property.id, host_id = %property.host_id, "Property created");

        if !property.is_approved_by_admin {
            dispatch_best_effort(
                "property_submitted",
                self.notifications
                    .notify_property_submitted(&property.id, &property.title, &host.name),
            )
            .await;
        }

        Ok(property)
    }

    /// Edit a listing's content. Approval flags are left alone.
    pub async fn update(
        &self,
        actor: &user::Model,
        property_id: &str,
        input: UpdatePropertyInput,
    ) -> AppResult<property::Model> {
        input.validate()?;

        let property = self.property_repo.get_by_id(property_id).await?;
        if property.host_id != actor.id && actor.role != Role::Admin {
            return Err(AppError::Forbidden(
                "You can only edit your own listings".to_string(),
            ));
        }

        let mut active: property::ActiveModel = property.into();

        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(property_type) = input.property_type {
            active.property_type = Set(property_type);
        }
        if let Some(bedrooms) = input.bedrooms {
            active.bedrooms = Set(bedrooms);
        }
        if let Some(bathrooms) = input.bathrooms {
            active.bathrooms = Set(bathrooms);
        }
        if let Some(max_guests) = input.max_guests {
            active.max_guests = Set(max_guests);
        }
        if let Some(price) = input.price_per_night {
            active.price_per_night = Set(price);
        }
        if let Some(images) = input.images {
            active.images = Set(serde_json::json!(images));
        }
        if let Some(amenities) = input.amenities {
            active.amenities = Set(serde_json::json!(amenities));
        }
        if let Some(location) = input.location {
            active.location = Set(to_json(&location)?);
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.property_repo.update(active).await
    }

    /// Public browse: active and approved listings only.
    pub async fn browse(
        &self,
        filter: &BrowseFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<property::Model>> {
        self.property_repo
            .find_published(filter, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }

    /// Show a listing by slug or id.
    ///
    /// Unpublished listings are visible to their host and to listing managers only.
    pub async fn get(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<property::Model> {
        let property = self
            .property_repo
            .find_by_slug_or_id(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Property {key}")))?;

        let visible = property.is_published()
            || viewer.is_some_and(|v| {
                v.id == property.host_id || has_capability(v, Capability::ManageListings)
            });

        if visible {
            Ok(property)
        } else {
            Err(AppError::NotFound(format!("Property {key}")))
        }
    }

    /// The caller's own listings.
    pub async fn list_mine(&self, actor: &user::Model) -> AppResult<Vec<property::Model>> {
        require_host(actor)?;
        self.property_repo.find_by_host(&actor.id).await
    }

    /// Back-office listing.
    pub async fn admin_list(
        &self,
        actor: &user::Model,
        pending_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<property::Model>> {
        require_capability(actor, Capability::ManageListings)?;
        self.property_repo
            .list(pending_only, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }
}

fn to_json(location: &Location) -> AppResult<serde_json::Value> {
    serde_json::to_value(location).map_err(|e| AppError::Internal(e.to_string()))
}

/// URL slug: lowercase ASCII words joined by `-`, suffixed with the id's tail.
fn slug_for(title: &str, id: &str) -> String {
    let mut slug = String::with_capacity(title.len() + 8);
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');

    let suffix = &id[id.len().saturating_sub(6)..];
    if trimmed.is_empty() {
        suffix.to_string()
    } else {
        format!("{trimmed}-{suffix}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use stayhub_db::repositories::NotificationRepository;
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> PropertyService {
        let user_repo = UserRepository::new(Arc::clone(&db));
        PropertyService::new(
            PropertyRepository::new(Arc::clone(&db)),
            user_repo.clone(),
            NotificationService::new(NotificationRepository::new(db), user_repo),
        )
    }

    fn create_input() -> CreatePropertyInput {
        CreatePropertyInput {
            title: "Harbour Loft".to_string(),
            description: "Two rooms over the marina".to_string(),
            property_type: "apartment".to_string(),
            bedrooms: 2,
            bathrooms: 1,
            max_guests: 4,
            price_per_night: 120,
            images: vec!["https://img.example.com/1.jpg".to_string()],
            amenities: vec!["wifi".to_string()],
            location: Location {
                city: "Porto".to_string(),
                country: "Portugal".to_string(),
                ..Default::default()
            },
            host_id: None,
        }
    }

    #[test]
    fn test_slug_for() {
        assert_eq!(
            slug_for("  Sea View: Villa!! ", "65f1a2b3c4d5e6f7a8b9c0d1"),
            "sea-view-villa-b9c0d1"
        );
        assert_eq!(slug_for("!!!", "65f1a2b3c4d5e6f7a8b9c0d1"), "b9c0d1");
    }

    #[tokio::test]
    async fn test_guest_cannot_create() {
        let guest = fixtures::user_with_role("g1", Role::Guest);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).create(&guest, create_input()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_host_listing_waits_for_approval() {
        let host = fixtures::user_with_role("hostA", Role::Host);
        let mut created = fixtures::property("p1", "hostA");
        created.is_active = false;
        created.is_approved_by_admin = false;

        // Staff lookup returns nobody: no notifications to insert
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let property = service(db).create(&host, create_input()).await.unwrap();
        assert!(!property.is_published());
    }

    #[tokio::test]
    async fn test_admin_listing_for_unknown_host() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let mut input = create_input();
        input.host_id = Some("missing".to_string());
        let result = service(db).create(&admin, input).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_admin_listing_for_guest_rejected() {
        let admin = fixtures::user_with_role("admin1", Role::Admin);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::user_with_role("guest1", Role::Guest)]])
                .into_connection(),
        );

        let mut input = create_input();
        input.host_id = Some("guest1".to_string());
        let result = service(Arc::clone(&db)).create(&admin, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let sql = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(!sql.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_update_by_other_host_forbidden() {
        let other = fixtures::user_with_role("hostB", Role::Host);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::property("p1", "hostA")]])
                .into_connection(),
        );

        let result = service(db)
            .update(&other, "p1", UpdatePropertyInput::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_unpublished_hidden_from_public() {
        let mut draft = fixtures::property("p1", "hostA");
        draft.is_approved_by_admin = false;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft.clone()], [draft]])
                .into_connection(),
        );
        let svc = service(db);

        let result = svc.get("p1", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let host = fixtures::user_with_role("hostA", Role::Host);
        assert!(svc.get("p1", Some(&host)).await.is_ok());
    }
}
