use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use tower_cookies::{cookie::SameSite, Cookie, Cookies, Key};

pub const SESSION_COOKIE: &str = "shelter_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub text: String,
}

/// The adoption submitted for a demo dog. It lives only in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderAdoption {
    pub dog_name: String,
    pub dog_breed: String,
    pub adopter_first_name: String,
    pub adopter_last_name: String,
    pub adopter_email: String,
    pub adopter_phone: String,
    pub request_date: String,
    pub tracking_code: String,
    pub status: String,
    pub photo_url: String,
}

/// Authenticated staff member, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentOperator {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    #[serde(default)]
    operator: Option<CurrentOperator>,
    #[serde(default)]
    flashes: Vec<Flash>,
    #[serde(default)]
    placeholder_adoption: Option<PlaceholderAdoption>,
}

/// Cookie-backed session. The payload is JSON, base64 encoded and signed
/// with the server key; a tampered or unreadable cookie yields an empty session.
#[derive(Clone)]
pub struct Session {
    cookies: Cookies,
    key: Key,
    data: SessionData,
}

impl Session {
    pub fn load(cookies: Cookies, key: Key) -> Self {
        let data = cookies
            .signed(&key)
            .get(SESSION_COOKIE)
            .and_then(|cookie| URL_SAFE_NO_PAD.decode(cookie.value()).ok())
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_default();
        Self { cookies, key, data }
    }

    pub fn operator(&self) -> Option<&CurrentOperator> {
        self.data.operator.as_ref()
    }

    pub fn is_staff(&self) -> bool {
        self.data.operator.is_some()
    }

    pub fn login(&mut self, operator: CurrentOperator) {
        self.data.operator = Some(operator);
        self.save();
    }

    pub fn logout(&mut self) {
        self.data.operator = None;
        self.data.placeholder_adoption = None;
        self.save();
    }

    pub fn flash(&mut self, level: Level, text: impl Into<String>) {
        self.data.flashes.push(Flash {
            level,
            text: text.into(),
        });
        self.save();
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if self.data.flashes.is_empty() {
            return Vec::new();
        }
        let flashes = std::mem::take(&mut self.data.flashes);
        self.save();
        flashes
    }

    pub fn placeholder_adoption(&self) -> Option<&PlaceholderAdoption> {
        self.data.placeholder_adoption.as_ref()
    }

    pub fn set_placeholder_adoption(&mut self, adoption: PlaceholderAdoption) {
        self.data.placeholder_adoption = Some(adoption);
        self.save();
    }

    fn save(&self) {
        let payload = match serde_json::to_vec(&self.data) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode session: {}", e);
                return;
            }
        };

        let mut cookie = Cookie::new(SESSION_COOKIE, URL_SAFE_NO_PAD.encode(payload));
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        self.cookies.signed(&self.key).add(cookie);
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await?;
        let key = parts
            .extensions
            .get::<Key>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session key missing"))?;
        Ok(Self::load(cookies, key))
    }
}
