use serde::{Deserialize, Serialize};

/// Body of `POST /tenants` and `POST /managers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub cognito_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

/// Body of `PUT /tenants/:cognitoId` and `PUT /managers/:cognitoId`. Absent
/// fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone_number.is_none()
    }
}
