use crate::types::Challenge;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Source of challenges and their hidden test suites.
///
/// The engine only reads from a catalog; who authors and stores challenges
/// is outside its concern.
pub trait ChallengeCatalog: Send + Sync {
    fn challenge(&self, challenge_id: &str) -> Option<Arc<Challenge>>;

    /// All known challenge ids, sorted.
    fn challenge_ids(&self) -> Vec<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read challenge catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse challenge catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate challenge id '{0}'")]
    Duplicate(String),
    #[error("challenge '{challenge}' test case {index}: {reason}")]
    InvalidCase {
        challenge: String,
        index: usize,
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct ChallengesFile {
    challenges: Vec<Challenge>,
}

/// In-memory catalog, usually loaded from `challenges.json`.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    challenges: HashMap<String, Arc<Challenge>>,
}

impl JsonCatalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let file: ChallengesFile = serde_json::from_str(content)?;
        Self::from_challenges(file.challenges)
    }

    pub fn from_challenges(challenges: Vec<Challenge>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::new();
        for challenge in challenges {
            validate_challenge(&challenge)?;
            if by_id.contains_key(&challenge.id) {
                return Err(CatalogError::Duplicate(challenge.id));
            }
            by_id.insert(challenge.id.clone(), Arc::new(challenge));
        }
        Ok(Self { challenges: by_id })
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

impl ChallengeCatalog for JsonCatalog {
    fn challenge(&self, challenge_id: &str) -> Option<Arc<Challenge>> {
        self.challenges.get(challenge_id).cloned()
    }

    fn challenge_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.challenges.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Every case must carry exactly the declared parameters with matching
/// shapes, and an expected value shaped like the return type.
fn validate_challenge(challenge: &Challenge) -> Result<(), CatalogError> {
    let entry = &challenge.entry_point;
    for (index, case) in challenge.test_cases.iter().enumerate() {
        let invalid = |reason: String| CatalogError::InvalidCase {
            challenge: challenge.id.clone(),
            index,
            reason,
        };

        let input = match &case.input {
            Value::Object(map) => map,
            _ => return Err(invalid("input must be an object".to_string())),
        };

        if input.len() != entry.params.len() {
            return Err(invalid(format!(
                "input has {} fields, entry point declares {} parameters",
                input.len(),
                entry.params.len()
            )));
        }

        for param in &entry.params {
            match input.get(&param.name) {
                Some(value) if param.kind.matches(value) => {}
                Some(_) => {
                    return Err(invalid(format!(
                        "parameter '{}' is not a {}",
                        param.name,
                        param.kind.describe()
                    )))
                }
                None => return Err(invalid(format!("missing parameter '{}'", param.name))),
            }
        }

        if !entry.returns.matches(&case.expected) {
            return Err(invalid(format!(
                "expected value is not a {}",
                entry.returns.describe()
            )));
        }
    }

    Ok(())
}
