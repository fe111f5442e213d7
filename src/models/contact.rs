//! Contact form message.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContact {
    pub fn into_contact(self, id: String, created_at: String) -> Contact {
        Contact {
            id,
            name: self.name,
            email: self.email,
            message: self.message,
            created_at,
        }
    }
}
