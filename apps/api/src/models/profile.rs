use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Candidate profile as returned by the profile store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub raw_resume_text: String,
}

impl Profile {
    /// Contact line shown under the name: `email | phone`, separator only when both exist.
    pub fn contact_line(&self) -> Option<String> {
        let email = self.email.trim();
        let phone = self.phone.trim();
        match (email.is_empty(), phone.is_empty()) {
            (true, true) => None,
            (false, true) => Some(email.to_string()),
            (true, false) => Some(phone.to_string()),
            (false, false) => Some(format!("{email} | {phone}")),
        }
    }
}
