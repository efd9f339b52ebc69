use crate::models::Provider;
use std::env;

/// Process-wide configuration, loaded once at startup from the environment.
///
/// The JWT signing secret lives here and is handed to `TokenCodec` at
/// construction; nothing else in the process reads it afterwards.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Symmetric signing key for session tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds (default one hour).
    pub jwt_expire_seconds: i64,
    /// Base URL of the frontend that federated logins redirect back to.
    pub frontend_url: String,
    /// Externally visible base URL of this service, used to build OAuth2
    /// redirect URIs.
    pub public_base_url: String,
    pub oauth: OAuthConfig,
}

/// Client registration for one OAuth2 provider.
#[derive(Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

/// Client registrations for the closed provider set.
#[derive(Clone)]
pub struct OAuthConfig {
    pub google: OAuthClient,
    pub kakao: OAuthClient,
    pub naver: OAuthClient,
}

impl OAuthConfig {
    pub fn client(&self, provider: Provider) -> &OAuthClient {
        match provider {
            Provider::Google => &self.google,
            Provider::Kakao => &self.kakao,
            Provider::Naver => &self.naver,
        }
    }
}

fn oauth_client(prefix: &str, auth_url: &str, token_url: &str, userinfo_url: &str) -> OAuthClient {
    OAuthClient {
        client_id: env::var(format!("{}_CLIENT_ID", prefix)).unwrap_or_default(),
        client_secret: env::var(format!("{}_CLIENT_SECRET", prefix)).unwrap_or_default(),
        auth_url: env::var(format!("{}_AUTH_URL", prefix)).unwrap_or_else(|_| auth_url.into()),
        token_url: env::var(format!("{}_TOKEN_URL", prefix)).unwrap_or_else(|_| token_url.into()),
        userinfo_url: env::var(format!("{}_USERINFO_URL", prefix))
            .unwrap_or_else(|_| userinfo_url.into()),
    }
}

impl Config {
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .expect("SERVER_PORT must be a number");
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port,
            server_host,
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expire_seconds: env::var("JWT_EXPIRE_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .expect("JWT_EXPIRE_SECONDS must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            public_base_url,
            oauth: OAuthConfig {
                google: oauth_client(
                    "GOOGLE",
                    "https://accounts.google.com/o/oauth2/v2/auth",
                    "https://oauth2.googleapis.com/token",
                    "https://www.googleapis.com/oauth2/v3/userinfo",
                ),
                kakao: oauth_client(
                    "KAKAO",
                    "https://kauth.kakao.com/oauth/authorize",
                    "https://kauth.kakao.com/oauth/token",
                    "https://kapi.kakao.com/v2/user/me",
                ),
                naver: oauth_client(
                    "NAVER",
                    "https://nid.naver.com/oauth2.0/authorize",
                    "https://nid.naver.com/oauth2.0/token",
                    "https://openapi.naver.com/v1/nid/me",
                ),
            },
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    /// Redirect URI registered with the provider for the callback endpoint.
    pub fn redirect_uri(&self, provider: Provider) -> String {
        format!("{}/login/oauth2/code/{}", self.public_base_url, provider)
    }
}
