use serde_json::Value;

use crate::auth::Role;

use super::{push_error, FieldErrors};

/// Validated registration payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Validate a user-registration payload.
pub fn validate_new_user(value: &Value) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();

    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            push_error(&mut errors, "body", "Expected an object");
            return Err(errors);
        }
    };

    let name = match obj.get("name").and_then(Value::as_str) {
        Some(name) if name.chars().count() >= 3 => Some(name.to_string()),
        Some(_) => {
            push_error(&mut errors, "name", "Name must have at least 3 characters");
            None
        }
        None => {
            push_error(&mut errors, "name", "Name is required");
            None
        }
    };

    let email = match obj.get("email").and_then(Value::as_str) {
        Some(email) if is_valid_email(email) => Some(email.to_string()),
        Some(_) => {
            push_error(&mut errors, "email", "Invalid email format");
            None
        }
        None => {
            push_error(&mut errors, "email", "Email is required");
            None
        }
    };

    let password = match obj.get("password").and_then(Value::as_str) {
        Some(password) if password.chars().count() >= 8 => Some(password.to_string()),
        Some(_) => {
            push_error(
                &mut errors,
                "password",
                "Password must have at least 8 characters",
            );
            None
        }
        None => {
            push_error(&mut errors, "password", "Password is required");
            None
        }
    };

    let role = match obj.get("role").and_then(Value::as_str) {
        Some(role) => match role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(()) => {
                push_error(&mut errors, "role", "Role must be 'seller' or 'admin'");
                None
            }
        },
        None => {
            push_error(&mut errors, "role", "Role is required");
            None
        }
    };

    match (name, email, password, role) {
        (Some(name), Some(email), Some(password), Some(role)) if errors.is_empty() => Ok(NewUser {
            name,
            email,
            password,
            role,
        }),
        _ => Err(errors),
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "name": "Test User",
            "email": "testuser@test.com",
            "password": "password",
            "role": "seller",
        })
    }

    #[test]
    fn accepts_valid_registration() {
        let user = validate_new_user(&valid_payload()).unwrap();
        assert_eq!(user.name, "Test User");
        assert_eq!(user.role, Role::Seller);
    }

    #[test]
    fn short_name_fails_with_field_error() {
        let mut payload = valid_payload();
        payload["name"] = json!("Te");

        let errors = validate_new_user(&payload).unwrap_err();
        assert_eq!(
            errors["name"],
            vec!["Name must have at least 3 characters".to_string()]
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn missing_fields_are_each_enumerated() {
        let errors = validate_new_user(&json!({})).unwrap_err();
        assert_eq!(errors["name"], vec!["Name is required".to_string()]);
        assert_eq!(errors["email"], vec!["Email is required".to_string()]);
        assert_eq!(errors["password"], vec!["Password is required".to_string()]);
        assert_eq!(errors["role"], vec!["Role is required".to_string()]);
    }

    #[test]
    fn rejects_malformed_email() {
        let mut payload = valid_payload();
        for bad in ["not-an-email", "a@b", "@test.com", "a b@test.com"] {
            payload["email"] = json!(bad);
            let errors = validate_new_user(&payload).unwrap_err();
            assert_eq!(errors["email"], vec!["Invalid email format".to_string()]);
        }
    }

    #[test]
    fn rejects_short_password() {
        let mut payload = valid_payload();
        payload["password"] = json!("1234567");
        let errors = validate_new_user(&payload).unwrap_err();
        assert_eq!(
            errors["password"],
            vec!["Password must have at least 8 characters".to_string()]
        );
    }

    #[test]
    fn rejects_roles_outside_the_closed_set() {
        let mut payload = valid_payload();
        payload["role"] = json!("client");
        let errors = validate_new_user(&payload).unwrap_err();
        assert_eq!(
            errors["role"],
            vec!["Role must be 'seller' or 'admin'".to_string()]
        );
    }
}
