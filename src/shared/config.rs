use crate::shared::error::ConfigError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_LOG_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_SERVICE: &str = "Amazon WorkSpaces";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFileSpec {
    pub file_name: String,
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProfile {
    pub service_name: String,
    pub parent_directory: String,
    pub target_directory: String,
    pub registry_path: String,
    #[serde(default)]
    pub settings_files: Vec<SettingsFileSpec>,
    /// Directory holding the `Cookies` database, relative to the target directory.
    #[serde(default)]
    pub cookie_path: Option<String>,
    /// Local-state file holding the wrapped cookie key, relative to the target
    /// directory. Defaults to Chrome's file under the user profile.
    #[serde(default)]
    pub local_state_path: Option<String>,
    #[serde(default)]
    pub log_extensions: Option<Vec<String>>,
}

impl ServiceProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid("service name cannot be empty".to_string()));
        }
        if self.parent_directory.trim().is_empty() || self.target_directory.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{}: parent and target directories are required",
                self.service_name
            )));
        }
        for spec in &self.settings_files {
            if spec.file_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{}: settings file name cannot be empty",
                    self.service_name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorSettings {
    #[serde(default = "default_max_log_size")]
    pub max_log_size: u64,
    #[serde(default = "default_log_extensions")]
    pub log_extensions: Vec<String>,
}

fn default_max_log_size() -> u64 {
    DEFAULT_MAX_LOG_SIZE
}

fn default_log_extensions() -> Vec<String> {
    vec![".log".to_string()]
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_log_size: default_max_log_size(),
            log_extensions: default_log_extensions(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DetectorConfig {
    #[serde(default)]
    pub settings: CollectorSettings,
    pub services: Vec<ServiceProfile>,
}

impl DetectorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Reading config from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: DetectorConfig = serde_yaml::from_str(content)?;
        for profile in &config.services {
            profile.validate()?;
        }
        info!("Loaded {} service profiles", config.services.len());
        Ok(config)
    }

    pub fn service(&self, name: &str) -> Result<&ServiceProfile, ConfigError> {
        self.services
            .iter()
            .find(|profile| profile.service_name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownService(name.to_string()))
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|p| p.service_name.as_str()).collect()
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            settings: CollectorSettings::default(),
            services: builtin_profiles(),
        }
    }
}

fn settings_file(file_name: &str, keys: &[&str]) -> SettingsFileSpec {
    SettingsFileSpec {
        file_name: file_name.to_string(),
        keys: keys.iter().map(|k| k.to_string()).collect(),
    }
}

pub fn builtin_profiles() -> Vec<ServiceProfile> {
    vec![
        ServiceProfile {
            service_name: "Amazon WorkSpaces".to_string(),
            parent_directory: "Amazon Web Services".to_string(),
            target_directory: "Amazon WorkSpaces".to_string(),
            registry_path: r"Software\Amazon Web Services, LLC\Amazon WorkSpaces".to_string(),
            settings_files: vec![
                settings_file("UserSettings.json", &["CurrentRegistration"]),
                settings_file("RegistrationList.json", &["RegistrationCode", "RegionKey", "OrgName"]),
            ],
            cookie_path: Some(r"EBWebView\Default\Network".to_string()),
            local_state_path: Some(r"EBWebView\Local State".to_string()),
            log_extensions: None,
        },
        ServiceProfile {
            service_name: "Citrix VDI".to_string(),
            parent_directory: "Citrix".to_string(),
            target_directory: "SelfService".to_string(),
            registry_path: r"Software\Citrix\Receiver".to_string(),
            settings_files: Vec::new(),
            cookie_path: None,
            local_state_path: None,
            log_extensions: Some(vec![".log".to_string(), ".txt".to_string()]),
        },
        ServiceProfile {
            service_name: "Gabia VDI".to_string(),
            parent_directory: "Gabia".to_string(),
            target_directory: "VDI".to_string(),
            registry_path: r"Software\Gabia".to_string(),
            settings_files: Vec::new(),
            cookie_path: None,
            local_state_path: None,
            log_extensions: None,
        },
    ]
}

/// Profile roots for one run. Only the binary reads the process environment;
/// the pipeline itself takes these explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEnvironment {
    pub local_app_data: PathBuf,
    pub user_profile: PathBuf,
}

impl CollectionEnvironment {
    pub fn new(local_app_data: impl Into<PathBuf>, user_profile: impl Into<PathBuf>) -> Self {
        Self {
            local_app_data: local_app_data.into(),
            user_profile: user_profile.into(),
        }
    }

    /// Reads `LOCALAPPDATA` and `USERPROFILE`, falling back to
    /// `<USERPROFILE>\AppData\Local` when only the profile root is set.
    pub fn from_process_env() -> Result<Self, ConfigError> {
        let user_profile = std::env::var_os("USERPROFILE")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::Invalid("USERPROFILE is not set".to_string()))?;
        let local_app_data = std::env::var_os("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| user_profile.join("AppData").join("Local"));
        Ok(Self::new(local_app_data, user_profile))
    }
}
