//! Database row types, mapped one-to-one from store rows. Distinct from
//! the portal-types API models so the storage layer stays independent of
//! the wire shapes.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

/// Timestamps are stored as RFC 3339 text, written by this module only.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("corrupt timestamp '{}': {}", s, e);
            DateTime::default()
        })
}

#[derive(Debug)]
pub struct AccountRow {
    pub id: i64,
    pub login: String,
    pub password: String,
    pub social_id: String,
    pub email: String,
    pub status: String,
}

#[derive(Debug)]
pub struct PlayerRow {
    pub account_id: i64,
    pub name: String,
    pub job: i64,
    pub level: i64,
    pub exp: i64,
}

pub struct GuildRow {
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

#[derive(Debug)]
pub struct DownloadRow {
    pub id: i64,
    pub provider: String,
    pub size: String,
    pub link: String,
    pub category: String,
    pub published: bool,
    pub site_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug)]
pub struct SiteRow {
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
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug)]
pub struct ImageRow {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub image_type: String,
    pub alt_text: Option<String>,
    pub file_size: Option<i64>,
    pub site_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug)]
pub struct PageRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub site_id: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct AdminGrantRow {
    pub account_id: i64,
    pub authority_level: i64,
}
