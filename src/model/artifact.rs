use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::classifier::Classifier;

/// A retrievable Maven binary unit with the classifiers that should be fetched for it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvnArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default)]
    pub classifiers: BTreeSet<Classifier>,
}

impl MvnArtifact {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            classifiers: BTreeSet::new(),
        }
    }

    pub fn with_classifiers(mut self, classifiers: impl IntoIterator<Item = Classifier>) -> Self {
        self.classifiers.extend(classifiers);
        self
    }

    /// Maven coordinates: `g:a:v[:extension:type]`
    pub fn mvn_coordinates(&self, classifier: Option<&Classifier>) -> String {
        let mut coordinates = format!("{}:{}:{}", self.group_id, self.artifact_id, self.version);
        if let Some(classifier) = classifier {
            coordinates.push_str(&format!(
                ":{}:{}",
                classifier.extension, classifier.classifier_type
            ));
        }
        coordinates
    }

    /// Gradle coordinates: `g:a:v[:type][@extension]`, jar extension implied
    pub fn gradle_coordinates(&self, classifier: Option<&Classifier>) -> String {
        let mut coordinates = format!("{}:{}:{}", self.group_id, self.artifact_id, self.version);
        if let Some(classifier) = classifier {
            if !classifier.classifier_type.is_empty() {
                coordinates.push(':');
                coordinates.push_str(&classifier.classifier_type);
            }
            if !classifier.extension.is_empty() && classifier.extension != "jar" {
                coordinates.push('@');
                coordinates.push_str(&classifier.extension);
            }
        }
        coordinates
    }

    /// The classifier that represents the artifact's payload.
    ///
    /// Prefers an untyped non-pom classifier, then any non-pom classifier,
    /// and falls back to the pom.
    pub fn main_classifier(&self) -> Classifier {
        self.classifiers
            .iter()
            .find(|c| c.classifier_type.is_empty() && c.extension != "pom")
            .or_else(|| self.classifiers.iter().find(|c| c.extension != "pom"))
            .cloned()
            .unwrap_or_else(Classifier::pom)
    }

    /// Classifiers describing project metadata (pom, sdk); `[pom]` if none are attached
    pub fn pom_classifiers(&self) -> Vec<Classifier> {
        let classifiers: Vec<Classifier> = self
            .classifiers
            .iter()
            .filter(|c| c.is_pom_like())
            .cloned()
            .collect();
        if classifiers.is_empty() {
            vec![Classifier::pom()]
        } else {
            classifiers
        }
    }

    pub fn file_name(&self, classifier: &Classifier) -> String {
        let suffix = if classifier.classifier_type.is_empty() {
            String::new()
        } else {
            format!("-{}", classifier.classifier_type)
        };
        format!(
            "{}-{}{}.{}",
            self.artifact_id, self.version, suffix, classifier.extension
        )
    }

    /// Location of the classifier's file inside a local repository rooted at `repository`
    pub fn local_path(&self, repository: &Path, classifier: &Classifier) -> PathBuf {
        let mut path = repository.to_path_buf();
        for group_part in self.group_id.split('.') {
            path.push(group_part);
        }
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.file_name(classifier));
        path
    }

    /// Repository-relative URL path (`com/haulmont/cuba/cuba-global/7.2.3/cuba-global-7.2.3.pom`)
    pub fn repository_path(&self, classifier: &Classifier) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name(classifier)
        )
    }

    /// Identity comparison ignoring classifiers
    pub fn is_same(&self, other: &MvnArtifact) -> bool {
        self.artifact_id == other.artifact_id
            && self.group_id == other.group_id
            && self.version == other.version
    }
}

impl fmt::Display for MvnArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mvn_coordinates(None))
    }
}
