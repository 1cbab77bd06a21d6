use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An endpoint serving `maven-metadata.xml` documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MavenRepository {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub credentials: Option<Credentials>,
}

pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

impl MavenRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        MavenRepository {
            id: id.into(),
            url: url.into(),
            credentials: None,
        }
    }

    pub fn maven_central() -> Self {
        MavenRepository::new("central", MAVEN_CENTRAL_URL)
    }

    pub fn with_credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        MavenRepository {
            credentials: Some(Credentials {
                username: username.into(),
                password: password.into(),
            }),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl Display for MavenRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}
