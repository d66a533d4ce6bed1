use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Credentials sent as HTTP basic auth
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authentication {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepositoryType {
    Local,
    Nexus2,
    Nexus3,
}

impl RepositoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryType::Local => "LOCAL",
            RepositoryType::Nexus2 => "NEXUS2",
            RepositoryType::Nexus3 => "NEXUS3",
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOCAL" => Ok(RepositoryType::Local),
            "NEXUS2" => Ok(RepositoryType::Nexus2),
            "NEXUS3" => Ok(RepositoryType::Nexus3),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Role a configured repository plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepositoryTarget {
    /// Where components are fetched from for install
    Source,
    /// Where resolved artifacts are installed or published
    Target,
    /// Registries queried for version discovery
    Search,
}

impl RepositoryTarget {
    pub fn all() -> [RepositoryTarget; 3] {
        [
            RepositoryTarget::Source,
            RepositoryTarget::Target,
            RepositoryTarget::Search,
        ]
    }

    /// Stable lowercase key used in repository ids and persisted rows
    pub fn id(&self) -> &'static str {
        match self {
            RepositoryTarget::Source => "source",
            RepositoryTarget::Target => "target",
            RepositoryTarget::Search => "search",
        }
    }
}

impl fmt::Display for RepositoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RepositoryTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepositoryTarget::all()
            .into_iter()
            .find(|target| target.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown repository target: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default = "default_active")]
    pub active: bool,
    pub name: String,
    #[serde(rename = "type")]
    pub repository_type: RepositoryType,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
    /// Repository name inside a Nexus3 instance, used to narrow searches
    #[serde(default)]
    pub repository_name: String,
}

fn default_active() -> bool {
    true
}

impl Repository {
    pub fn new(name: &str, repository_type: RepositoryType, url: &str) -> Self {
        Self {
            active: true,
            name: name.to_string(),
            repository_type,
            url: url.to_string(),
            authentication: None,
            repository_name: String::new(),
        }
    }

    pub fn with_auth(mut self, login: &str, password: &str) -> Self {
        self.authentication = Some(Authentication {
            login: login.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn with_repository_name(mut self, repository_name: &str) -> Self {
        self.repository_name = repository_name.to_string();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("source", RepositoryTarget::Source)]
    #[case("TARGET", RepositoryTarget::Target)]
    #[case("Search", RepositoryTarget::Search)]
    fn target_parses_case_insensitively(#[case] raw: &str, #[case] expected: RepositoryTarget) {
        assert_eq!(raw.parse::<RepositoryTarget>().unwrap(), expected);
    }

    #[test]
    fn target_rejects_unknown_value() {
        assert!("publish".parse::<RepositoryTarget>().is_err());
    }

    #[rstest]
    #[case("local", RepositoryType::Local)]
    #[case("NEXUS2", RepositoryType::Nexus2)]
    #[case("nexus3", RepositoryType::Nexus3)]
    fn type_parses_case_insensitively(#[case] raw: &str, #[case] expected: RepositoryType) {
        assert_eq!(raw.parse::<RepositoryType>().unwrap(), expected);
    }

    #[test]
    fn repository_json_uses_uppercase_type() {
        let repository = Repository::new("cuba-nexus", RepositoryType::Nexus2, "https://repo")
            .with_auth("cuba", "cuba123");

        let json = serde_json::to_value(&repository).unwrap();

        assert_eq!(json["type"], "NEXUS2");
        assert_eq!(json["authentication"]["login"], "cuba");
        assert_eq!(json["active"], true);
    }

    #[test]
    fn repository_deserializes_with_defaults() {
        let repository: Repository =
            serde_json::from_str(r#"{"name": "local", "type": "LOCAL", "url": "/tmp/m2"}"#)
                .unwrap();

        assert_eq!(repository, Repository::new("local", RepositoryType::Local, "/tmp/m2"));
    }
}
