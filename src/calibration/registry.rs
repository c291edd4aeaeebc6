//! Process-wide set of calibration profiles keyed by strip type

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::profile::CalibrationProfile;
use crate::constants::calibration::STANDARD_PROFILE;
use crate::error::{AnalysisError, Result};

/// Read-only lookup of calibration profiles.
///
/// Built once at startup and shared by every analysis; profiles are handed
/// out as `Arc`s so requests never copy or mutate them.
#[derive(Debug, Clone)]
pub struct CalibrationRegistry {
    profiles: BTreeMap<String, Arc<CalibrationProfile>>,
}

impl Default for CalibrationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CalibrationRegistry {
    /// Registry holding only the built-in `standard` profile
    pub fn builtin() -> Self {
        Self::empty().with_profile(CalibrationProfile::standard())
    }

    fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Add or replace a profile under its own name
    pub fn with_profile(mut self, profile: CalibrationProfile) -> Self {
        self.profiles
            .insert(profile.name().to_string(), Arc::new(profile));
        self
    }

    /// Built-in profiles plus those in a JSON array file
    ///
    /// Entries with the name of a built-in profile replace it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let profiles: Vec<CalibrationProfile> = serde_json::from_str(content)
            .map_err(|e| AnalysisError::config("Invalid calibration profile JSON", e))?;
        Ok(profiles
            .into_iter()
            .fold(Self::builtin(), |registry, profile| registry.with_profile(profile)))
    }

    /// Look up a profile by strip type
    ///
    /// # Errors
    ///
    /// `AnalysisError::UnknownProfile` if no profile has that name.
    pub fn get(&self, name: &str) -> Result<Arc<CalibrationProfile>> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownProfile {
                name: name.to_string(),
            })
    }

    /// Name of the profile used when the caller does not pick one
    pub fn default_name(&self) -> &'static str {
        STANDARD_PROFILE
    }

    pub fn default_profile(&self) -> Result<Arc<CalibrationProfile>> {
        self.get(self.default_name())
    }

    /// Registered strip types in sorted order
    pub fn supported_types(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}
