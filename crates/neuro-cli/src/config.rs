use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use neuro_domains::{DomainRule, PatientType, RuleSet};
use neuro_llm::ollama::DEFAULT_BASE_URL;
use neuro_llm::{ClientConfig, ModelCatalogue};
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub patient: PatientConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default = "ModelCatalogue::local_defaults")]
    pub models: ModelCatalogue,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    /// Domains generated at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub validate_all_outputs: bool,
    /// Evidence rule overrides keyed by domain key (`"adaptive"`, `"memory"`, ...).
    #[serde(default)]
    pub domain_rules: BTreeMap<String, DomainRule>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// JSON Lines usage journal. No journal when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
    /// Tera template that replaces the built-in narrative layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_template: Option<PathBuf>,
    /// Added in v1.
    #[serde(default = "default_true")]
    pub integrated_summary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientConfig {
    pub name: String,
    pub patient_type: PatientType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    Ollama {
        #[serde(default = "default_base_url")]
        base_url: String,
    },
    Bedrock {
        region: String,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Ollama {
            base_url: default_base_url(),
        }
    }
}

fn default_max_retries() -> u32 {
    neuro_llm::client::DEFAULT_MAX_RETRIES
}

fn default_attempt_timeout_secs() -> u64 {
    neuro_llm::client::DEFAULT_ATTEMPT_TIMEOUT.as_secs()
}

fn default_concurrency() -> usize {
    4
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("report")
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ReportConfig {
    pub fn new(patient: PatientConfig) -> Self {
        Self {
            config_version: CURRENT_VERSION,
            patient,
            backend: BackendConfig::default(),
            models: ModelCatalogue::local_defaults(),
            max_retries: default_max_retries(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            concurrency: default_concurrency(),
            validate_all_outputs: false,
            domain_rules: BTreeMap::new(),
            output_dir: default_output_dir(),
            ledger_path: None,
            narrative_template: None,
            integrated_summary: true,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            max_retries: self.max_retries,
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            validate_all: self.validate_all_outputs,
        }
    }

    pub fn rule_set(&self) -> eyre::Result<RuleSet> {
        Ok(RuleSet::from_overrides(&self.domain_rules)?)
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("neuroreport"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn load_config(path: &Path) -> eyre::Result<ReportConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: ReportConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update neuroreport."
        ));
    }

    // v0 → v1: integrated summary becomes a switch, on by default
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.entry("integrated_summary")
            .or_insert(serde_json::Value::Bool(true));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added integrated_summary)");
    }

    Ok(json)
}

pub fn save_config(config: &ReportConfig, path: &Path) -> eyre::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // Patient names live here; keep it private on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn patient() -> PatientConfig {
        PatientConfig {
            name: "Jordan".to_string(),
            patient_type: PatientType::Child,
        }
    }

    #[test]
    fn minimal_v1_config_fills_defaults() {
        let config: ReportConfig = serde_json::from_value(json!({
            "config_version": 1,
            "patient": {"name": "Jordan", "patient_type": "child"}
        }))
        .unwrap();

        assert_eq!(config.backend, BackendConfig::default());
        assert_eq!(config.models, ModelCatalogue::local_defaults());
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.attempt_timeout_secs, 120);
        assert_eq!(config.concurrency, 4);
        assert!(!config.validate_all_outputs);
        assert!(config.integrated_summary);
        assert_eq!(config.output_dir, PathBuf::from("report"));
    }

    #[test]
    fn v0_is_migrated() {
        let migrated = migrate(
            json!({"patient": {"name": "Jordan", "patient_type": "adult"}}),
            0,
        )
        .unwrap();
        assert_eq!(migrated["config_version"], 1);
        assert_eq!(migrated["integrated_summary"], true);
    }

    #[test]
    fn migration_keeps_an_explicit_choice() {
        let migrated = migrate(json!({"integrated_summary": false}), 0).unwrap();
        assert_eq!(migrated["integrated_summary"], false);
    }

    #[test]
    fn newer_versions_are_refused() {
        let err = migrate(json!({"config_version": 9}), 9).unwrap_err();
        assert!(err.to_string().contains("newer than this build supports"));
    }

    #[test]
    fn bedrock_backend_parses() {
        let backend: BackendConfig =
            serde_json::from_value(json!({"type": "bedrock", "region": "us-west-2"})).unwrap();
        assert_eq!(
            backend,
            BackendConfig::Bedrock {
                region: "us-west-2".to_string()
            }
        );
    }

    #[test]
    fn unknown_rule_key_is_an_error() {
        let mut config = ReportConfig::new(patient());
        config
            .domain_rules
            .insert("astrology".to_string(), DomainRule::default());
        assert!(config.rule_set().is_err());
    }

    #[test]
    fn client_config_follows_settings() {
        let mut config = ReportConfig::new(patient());
        config.max_retries = 3;
        config.attempt_timeout_secs = 30;
        config.validate_all_outputs = true;

        let client = config.client_config();
        assert_eq!(client.max_retries, 3);
        assert_eq!(client.attempt_timeout, Duration::from_secs(30));
        assert!(client.validate_all);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");
        let mut config = ReportConfig::new(patient());
        config.config_version = 0;
        config.ledger_path = Some(dir.path().join("usage.jsonl"));

        save_config(&config, &path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.config_version, CURRENT_VERSION);
        assert_eq!(loaded.patient, config.patient);
        assert_eq!(loaded.ledger_path, config.ledger_path);
    }
}
