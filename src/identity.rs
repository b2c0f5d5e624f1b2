use std::collections::BTreeMap;
use std::sync::OnceLock;

use rand::RngCore;

/// Label key used to tag every artifact a run creates.
pub const DEFAULT_LABEL_KEY: &str = "name.scalability.experiments.test.example.com";

/// Suffix appended to generated resource names.
pub const DEFAULT_RESOURCE_SUFFIX: &str = ".test.example.com";

/// Returns 16 random bytes as a 32 character lowercase hex string.
///
/// Draws from the thread-local CSPRNG, which is seeded from the OS. If the OS
/// source is unavailable this panics: nothing else can be trusted to stay
/// unique without it.
pub fn random_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Naming state for one run.
///
/// The label is computed on first access and then fixed for the lifetime of
/// the identity, no matter how many workers ask for it concurrently.
#[derive(Debug)]
pub struct RunIdentity {
    name: String,
    resource_suffix: String,
    label_key: String,
    label: OnceLock<String>,
}

impl RunIdentity {
    pub fn new(
        name: impl Into<String>,
        resource_suffix: impl Into<String>,
        label_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_suffix: resource_suffix.into(),
            label_key: label_key.into(),
            label: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    /// `"{name}-{random_id}"`, memoized.
    pub fn label(&self) -> &str {
        self.label.get_or_init(|| format!("{}-{}", self.name, random_id()))
    }

    /// `"{name}-{random_id}{suffix}"`, fresh on every call.
    pub fn resource_name(&self) -> String {
        format!("{}-{}{}", self.name, random_id(), self.resource_suffix)
    }

    /// Filter expression selecting everything tagged with this run's label.
    pub fn label_selector(&self) -> String {
        format!("{}={}", self.label_key, self.label())
    }

    /// Tags a fixture's label map with this run's label.
    pub fn apply_label(&self, labels: &mut BTreeMap<String, String>) {
        labels.insert(self.label_key.clone(), self.label().to_string());
    }
}
