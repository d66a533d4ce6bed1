use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A (type, extension) pair distinguishing artifact variants of one coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Classifier {
    #[serde(rename = "type", default)]
    pub classifier_type: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "jar".to_string()
}

impl Classifier {
    /// Classifier with the given type and a `jar` extension
    pub fn new(classifier_type: &str) -> Self {
        Self::with_extension(classifier_type, "jar")
    }

    pub fn with_extension(classifier_type: &str, extension: &str) -> Self {
        Self {
            classifier_type: classifier_type.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn jar() -> Self {
        Self::new("")
    }

    pub fn pom() -> Self {
        Self::with_extension("", "pom")
    }

    pub fn sources() -> Self {
        Self::new("sources")
    }

    pub fn javadoc() -> Self {
        Self::new("javadoc")
    }

    pub fn client() -> Self {
        Self::new("client")
    }

    pub fn sdk() -> Self {
        Self::with_extension("", "sdk")
    }

    /// Classifiers attached to a component unless told otherwise
    pub fn default_set() -> BTreeSet<Classifier> {
        BTreeSet::from([Self::jar(), Self::pom(), Self::sources()])
    }

    pub fn is_pom_like(&self) -> bool {
        self.extension == "pom" || self.extension == "sdk"
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::jar()
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classifier_type.is_empty() {
            write!(f, "{}", self.extension)
        } else {
            write!(f, "{}.{}", self.classifier_type, self.extension)
        }
    }
}
