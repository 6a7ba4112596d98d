//! Zepp account authentication
//!
//! Implements the two-stage Mi-Fit/Zepp login flow: an email/password POST
//! that answers with a redirect carrying an access token in its query
//! string, followed by a token login that yields the session the data APIs
//! accept. API comms approach after Michael Wyraz's hacking-mifit-api notes.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::LOCATION;
use reqwest::{redirect, Client};
use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::error::{Result, ZeppError};

/// Registration (email login) API host
const DEFAULT_USER_BASE: &str = "https://api-user.huami.com";

/// Account (token login) API host
const DEFAULT_ACCOUNT_BASE: &str = "https://account.huami.com";

/// Where the provider sends the browser after a successful email login;
/// only the query string of the redirect matters to us
const REDIRECT_URI: &str = "https://s3-us-west-2.amazonws.com/hm-registration/successsignin.html";

/// Hosts the session token is valid for, as the vendor app sends them
const TOKEN_DOMAINS: &str = "account.huami.com,api-user.huami.com,api-watch.huami.com,\
api-analytics.huami.com,app-analytics.huami.com,api-mifit.huami.com";

/// Percent-encode everything in a path segment except unreserved characters
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An authenticated session: everything the data APIs need
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub app_token: String,
    pub user_id: String,
}

/// Token login response; the provider sends far more, only `token_info`
/// is of any use
#[derive(Debug, Deserialize)]
struct TokenLoginResponse {
    #[serde(default)]
    token_info: Option<TokenInfo>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    app_token: String,
    #[serde(deserialize_with = "string_or_number")]
    user_id: String,
}

/// Some accounts get a numeric user id, some a string
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(DeError::custom(format!("expected a user id, got {other}"))),
    }
}

/// Client for the two-stage Zepp login
pub struct AuthClient {
    client: Client,
    user_base: String,
    account_base: String,
}

impl AuthClient {
    /// Create a new auth client against the production hosts
    pub fn new() -> Result<Self> {
        Self::with_base_urls(DEFAULT_USER_BASE, DEFAULT_ACCOUNT_BASE)
    }

    /// Create an auth client with custom hosts (for testing)
    #[doc(hidden)]
    pub fn with_base_urls(user_base: &str, account_base: &str) -> Result<Self> {
        // The email stage answers with a redirect we must inspect,
        // not follow
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(ZeppError::Http)?;

        Ok(Self {
            client,
            user_base: user_base.trim_end_matches('/').to_string(),
            account_base: account_base.trim_end_matches('/').to_string(),
        })
    }

    /// Perform the full login flow, yielding a session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        info!(email, "logging in");
        let (access_token, country_code) = self.email_auth(email, password).await?;
        info!("obtained access token");
        self.token_login(&access_token, &country_code).await
    }

    /// Stage one: trade email/password for a redirect-embedded access token
    async fn email_auth(&self, email: &str, password: &str) -> Result<(String, String)> {
        let url = format!(
            "{}/registrations/{}/tokens",
            self.user_base,
            utf8_percent_encode(email, PATH_SEGMENT)
        );

        let form = [
            ("state", "REDIRECTION"),
            ("client_id", "HuaMi"),
            ("redirect_uri", REDIRECT_URI),
            ("token", "access"),
            ("password", password),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(ZeppError::Http)?;

        let status = response.status();
        if !status.is_redirection() {
            return Err(ZeppError::auth_rejected(format!(
                "provider did not redirect (status {status})"
            )));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ZeppError::auth_rejected("redirect carried no Location header"))?;

        extract_redirect_params(location)
    }

    /// Stage two: trade the access token for an app token and user id
    async fn token_login(&self, access_token: &str, country_code: &str) -> Result<Session> {
        let url = format!("{}/v2/client/login", self.account_base);

        let form = [
            ("app_name", "com.xiaomi.hm.health"),
            ("dn", TOKEN_DOMAINS),
            ("device_id", "02:00:00:00:00:00"),
            ("device_model", "android_phone"),
            ("app_version", "4.0.9"),
            ("allow_registration", "false"),
            ("third_name", "huami"),
            ("grant_type", "access_token"),
            ("country_code", country_code),
            ("code", access_token),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(ZeppError::Http)?;

        let login: TokenLoginResponse = response.json().await.map_err(|e| {
            ZeppError::invalid_response(format!("failed to parse token login response: {e}"))
        })?;

        let token_info = login
            .token_info
            .ok_or_else(|| ZeppError::auth_rejected("token login response had no token_info"))?;

        Ok(Session {
            app_token: token_info.app_token,
            user_id: token_info.user_id,
        })
    }
}

/// Pull `access` and `country_code` out of a redirect URL's query string
fn extract_redirect_params(location: &str) -> Result<(String, String)> {
    let url = Url::parse(location)
        .map_err(|e| ZeppError::invalid_response(format!("unparseable redirect URL: {e}")))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    let access = param("access").ok_or_else(|| ZeppError::missing_token("access"))?;
    let country_code = param("country_code").ok_or_else(|| ZeppError::missing_token("country_code"))?;

    Ok((access, country_code))
}
