use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    // Credentials and reset state never serialize into a response
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The `user` object embedded in register/login responses
    pub fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "name": self.name,
            "role": self.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_omits_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: "seller".to_string(),
            reset_token: Some("deadbeef".to_string()),
            reset_token_expires: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("resetToken").is_none());
        assert!(value.get("resetTokenExpires").is_none());
        assert_eq!(value["email"], "a@b.com");

        let summary = user.summary();
        assert_eq!(summary["role"], "seller");
        assert!(summary.get("passwordHash").is_none());
    }
}
