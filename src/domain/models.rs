use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /users/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistration {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserRegistration {
    /// Check the fields serde cannot: non-blank username, plausible email.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        let Some((local, domain)) = self.email.split_once('@') else {
            return Err("email must contain '@'".to_string());
        };
        if local.is_empty() || domain.is_empty() {
            return Err("email must have a local part and a domain".to_string());
        }
        Ok(())
    }
}

/// Body of `POST /orders`. Items are opaque to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub user_id: u64,
    pub items: Vec<Value>,
    pub total_amount: f64,
}

impl OrderRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("order must contain at least one item".to_string());
        }
        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            return Err("total_amount must be a non-negative number".to_string());
        }
        Ok(())
    }
}
