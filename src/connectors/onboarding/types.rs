use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BioData {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

/// User profile as stored by the onboarding service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub primary_phone: Option<String>,
    #[serde(default)]
    pub user_bio_data: BioData,
}

/// Credentials handed out after a successful sign up or login
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthCredentialResponse {
    #[serde(rename = "customToken", default)]
    pub custom_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub uid: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub profile: UserProfile,
    pub auth: AuthCredentialResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpResponse {
    pub otp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub scopes: Vec<String>,
}
