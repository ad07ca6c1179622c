//! Model builders shared by service tests.

use chrono::{NaiveDate, Utc};
use serde_json::json;
use stayhub_db::entities::{
    booking::{self, BookingStatus, PaymentStatus},
    notification::{self, NotificationType},
    pending_user_deletion::{self, DeletionRequestStatus},
    property, review,
    user::{self, Role},
};

pub fn user_with_role(id: &str, role: Role) -> user::Model {
    user::Model {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        password_hash: "$argon2id$stub".to_string(),
        name: format!("User {id}"),
        phone: None,
        role,
        is_approved: true,
        permissions: None,
        token: Some(format!("token-{id}")),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn sub_admin(id: &str, perms: user::Permissions) -> user::Model {
    let mut model = user_with_role(id, Role::SubAdmin);
    model.permissions = Some(perms);
    model
}

pub fn property(id: &str, host_id: &str) -> property::Model {
    property::Model {
        id: id.to_string(),
        title: "Harbour Loft".to_string(),
        slug: format!("harbour-loft-{id}"),
        description: "Two rooms over the marina".to_string(),
        property_type: "apartment".to_string(),
        bedrooms: 2,
        bathrooms: 1,
        max_guests: 4,
        price_per_night: 120,
        images: json!([]),
        amenities: json!(["wifi"]),
        location: json!({"city": "Porto", "country": "Portugal"}),
        host_id: host_id.to_string(),
        is_active: true,
        is_approved_by_admin: true,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn booking(id: &str, property_id: &str, guest_id: &str) -> booking::Model {
    booking::Model {
        id: id.to_string(),
        property_id: property_id.to_string(),
        guest_id: guest_id.to_string(),
        check_in: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap_or_default(),
        check_out: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap_or_default(),
        guests: 2,
        total_price: 360,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Pending,
        created_at: Utc::now().into(),
    }
}

pub fn review(id: &str, property_id: &str, guest_id: &str, rating: i16) -> review::Model {
    review::Model {
        id: id.to_string(),
        property_id: property_id.to_string(),
        guest_id: guest_id.to_string(),
        rating,
        comment: "Lovely stay".to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn notification(id: &str, user_id: &str) -> notification::Model {
    notification::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: "Title".to_string(),
        message: "Message".to_string(),
        notification_type: NotificationType::Info,
        is_read: false,
        related_id: None,
        related_type: None,
        data: None,
        created_at: Utc::now().into(),
    }
}

pub fn deletion_request(
    id: &str,
    user_id: &str,
    requested_by: &str,
    status: DeletionRequestStatus,
) -> pending_user_deletion::Model {
    pending_user_deletion::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        user_email: format!("{user_id}@example.com"),
        user_name: format!("User {user_id}"),
        requested_by: requested_by.to_string(),
        reason: Some("spam listings".to_string()),
        status,
        created_at: Utc::now().into(),
        processed_at: None,
        processed_by: None,
    }
}
