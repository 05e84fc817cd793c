use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

/// Header carrying a plain API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Username/password pair for HTTP basic auth.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// Every credential form a data source may carry.
///
/// More than one may be present; [`AuthScheme::resolve`] decides which
/// one is actually sent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub bearer_token: Option<SecretString>,
    pub api_key: Option<SecretString>,
    pub basic_auth: Option<BasicAuth>,
}

/// Which scheme a request is sent with.
///
/// Marker enum (no data) -- the actual secret lives in [`AuthScheme`].
/// Useful for logging and assertions without carrying secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    Bearer,
    ApiKey,
    Basic,
    None,
}

/// The single auth scheme applied to outgoing requests.
#[derive(Debug, Clone, Default)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer(SecretString),
    /// `X-API-Key: <key>`
    ApiKey(SecretString),
    /// `Authorization: Basic base64(user:pass)`
    Basic {
        username: String,
        password: SecretString,
    },
    /// Unauthenticated.
    #[default]
    None,
}

fn present(secret: Option<&SecretString>) -> Option<&SecretString> {
    secret.filter(|s| !s.expose_secret().is_empty())
}

impl AuthScheme {
    /// Pick exactly one scheme: bearer token, else API key, else basic
    /// auth, else none. Empty secrets count as absent; basic auth needs
    /// both a username and a password.
    pub fn resolve(credentials: &Credentials) -> Self {
        if let Some(token) = present(credentials.bearer_token.as_ref()) {
            return Self::Bearer(token.clone());
        }
        if let Some(key) = present(credentials.api_key.as_ref()) {
            return Self::ApiKey(key.clone());
        }
        if let Some(basic) = &credentials.basic_auth {
            if !basic.username.is_empty() && !basic.password.expose_secret().is_empty() {
                return Self::Basic {
                    username: basic.username.clone(),
                    password: basic.password.clone(),
                };
            }
        }
        Self::None
    }

    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::Bearer(_) => AuthStrategy::Bearer,
            Self::ApiKey(_) => AuthStrategy::ApiKey,
            Self::Basic { .. } => AuthStrategy::Basic,
            Self::None => AuthStrategy::None,
        }
    }

    /// The header this scheme writes, if any.
    pub fn header_name(&self) -> Option<HeaderName> {
        match self {
            Self::Bearer(_) | Self::Basic { .. } => Some(AUTHORIZATION),
            Self::ApiKey(_) => Some(HeaderName::from_static("x-api-key")),
            Self::None => None,
        }
    }

    /// Drop any caller-supplied header this scheme is about to set, so the
    /// configured credential replaces it instead of being sent twice.
    pub fn strip_conflicting(&self, headers: &mut HeaderMap) {
        if let Some(name) = self.header_name() {
            headers.remove(name);
        }
    }

    /// Attach the scheme to a request.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Bearer(token) => builder.bearer_auth(token.expose_secret()),
            Self::ApiKey(key) => match HeaderValue::from_str(key.expose_secret()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    builder.header(API_KEY_HEADER, value)
                }
                // reqwest defers the encoding error to `send()`.
                Err(_) => builder.header(API_KEY_HEADER, key.expose_secret()),
            },
            Self::Basic { username, password } => {
                builder.basic_auth(username, Some(password.expose_secret()))
            }
            Self::None => builder,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> Option<SecretString> {
        Some(SecretString::from(s.to_owned()))
    }

    fn basic(user: &str, pass: &str) -> Option<BasicAuth> {
        Some(BasicAuth {
            username: user.into(),
            password: SecretString::from(pass.to_owned()),
        })
    }

    #[test]
    fn bearer_wins_over_everything() {
        let creds = Credentials {
            bearer_token: secret("tok"),
            api_key: secret("key"),
            basic_auth: basic("u", "p"),
        };
        let scheme = AuthScheme::resolve(&creds);
        assert_eq!(scheme.strategy(), AuthStrategy::Bearer);
        assert!(matches!(scheme, AuthScheme::Bearer(ref t) if t.expose_secret() == "tok"));
    }

    #[test]
    fn api_key_wins_over_basic() {
        let creds = Credentials {
            bearer_token: None,
            api_key: secret("key"),
            basic_auth: basic("u", "p"),
        };
        assert_eq!(AuthScheme::resolve(&creds).strategy(), AuthStrategy::ApiKey);
    }

    #[test]
    fn basic_when_only_basic() {
        let creds = Credentials {
            basic_auth: basic("u", "p"),
            ..Credentials::default()
        };
        assert_eq!(AuthScheme::resolve(&creds).strategy(), AuthStrategy::Basic);
    }

    #[test]
    fn empty_secrets_are_ignored() {
        let creds = Credentials {
            bearer_token: secret(""),
            api_key: secret(""),
            basic_auth: basic("u", "p"),
        };
        assert_eq!(AuthScheme::resolve(&creds).strategy(), AuthStrategy::Basic);
    }

    #[test]
    fn basic_needs_both_halves() {
        let creds = Credentials {
            basic_auth: basic("u", ""),
            ..Credentials::default()
        };
        assert_eq!(AuthScheme::resolve(&creds).strategy(), AuthStrategy::None);
    }

    #[test]
    fn nothing_configured_is_unauthenticated() {
        let scheme = AuthScheme::resolve(&Credentials::default());
        assert_eq!(scheme.strategy(), AuthStrategy::None);
        assert!(scheme.header_name().is_none());
    }

    #[test]
    fn strip_conflicting_removes_only_the_scheme_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));
        headers.insert("x-api-key", HeaderValue::from_static("caller"));

        AuthScheme::ApiKey(SecretString::from("k".to_owned())).strip_conflicting(&mut headers);

        assert!(headers.get("x-api-key").is_none());
        assert!(headers.get(AUTHORIZATION).is_some());
    }
}
