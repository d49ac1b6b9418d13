use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Account --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "BANNED")]
    Banned,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Ok => "OK",
            AccountStatus::Banned => "BANNED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(AccountStatus::Ok),
            "BANNED" => Some(AccountStatus::Banned),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
    pub email: String,
    pub social_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountUpdateRequest {
    pub email: Option<String>,
    pub social_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordUpdateRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub login: String,
    pub email: String,
    pub social_id: String,
    pub status: AccountStatus,
}

// -- Player / Guild --

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub account_id: i64,
    pub name: String,
    pub job: i64,
    pub level: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerListResponse {
    pub players: Vec<PlayerResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GuildResponse {
    pub id: i64,
    pub name: String,
    pub master: i64,
    pub level: i64,
    pub exp: i64,
    pub skill_point: i64,
    pub skill: Option<String>,
    pub win: i64,
    pub draw: i64,
    pub loss: i64,
    pub ladder_point: i64,
    pub gold: i64,
}

// -- Download --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadCreateRequest {
    pub provider: String,
    pub size: String,
    pub link: String,
    pub category: String,
    #[serde(default)]
    pub published: bool,
    pub site_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadUpdateRequest {
    pub provider: Option<String>,
    pub size: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
    pub site_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub id: i64,
    pub provider: String,
    pub size: String,
    pub link: String,
    pub category: String,
    pub published: bool,
    pub site_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Site --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteCreateRequest {
    pub name: String,
    pub slug: String,
    pub initial_level: String,
    pub max_level: String,
    pub rates: Option<String>,
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub facebook_enable: bool,
    pub footer_info: Option<String>,
    #[serde(default)]
    pub footer_menu_enable: bool,
    #[serde(default)]
    pub footer_info_enable: bool,
    pub forum_url: Option<String>,
    #[serde(default)]
    pub last_online: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteUpdateRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub initial_level: Option<String>,
    pub max_level: Option<String>,
    pub rates: Option<String>,
    pub facebook_url: Option<String>,
    pub facebook_enable: Option<bool>,
    pub footer_info: Option<String>,
    pub footer_menu_enable: Option<bool>,
    pub footer_info_enable: Option<bool>,
    pub forum_url: Option<String>,
    pub last_online: Option<bool>,
    pub is_active: Option<bool>,
    pub maintenance_mode: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SiteResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub initial_level: String,
    pub max_level: String,
    pub rates: Option<String>,
    pub facebook_url: Option<String>,
    pub facebook_enable: bool,
    pub footer_info: Option<String>,
    pub footer_menu_enable: bool,
    pub footer_info_enable: bool,
    pub forum_url: Option<String>,
    pub last_online: bool,
    pub is_active: bool,
    pub maintenance_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Image --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Logo,
    Background,
}

impl ImageType {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Logo => "logo",
            ImageType::Background => "background",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "logo" => Some(ImageType::Logo),
            "background" => Some(ImageType::Background),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageCreateRequest {
    pub name: String,
    pub path: String,
    pub image_type: ImageType,
    pub alt_text: Option<String>,
    pub file_size: Option<i64>,
    pub site_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageUpdateRequest {
    pub name: Option<String>,
    pub path: Option<String>,
    pub image_type: Option<ImageType>,
    pub alt_text: Option<String>,
    pub file_size: Option<i64>,
    pub site_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageResponse {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub image_type: ImageType,
    pub alt_text: Option<String>,
    pub file_size: Option<i64>,
    pub site_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Page --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageCreateRequest {
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub published: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub site_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageUpdateRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub site_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub site_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct IsAdminResponse {
    pub account_id: i64,
    pub authority_level: i64,
}

fn default_true() -> bool {
    true
}
