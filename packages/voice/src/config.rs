//! Speech service configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the speech service finds its model assets and how it samples.
///
/// Each `*_id` names a Hugging Face repository used when the matching
/// local override is `None`; with all overrides set the service never
/// touches the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// CSM model repository (weights + config.json).
    pub model_id: String,
    /// Tokenizer repository (tokenizer.json).
    pub tokenizer_id: String,
    /// Mimi codec repository (model.safetensors).
    pub codec_id: String,

    /// Local `model.safetensors` override for the CSM weights.
    pub weights: Option<PathBuf>,
    /// Local `config.json` override for the CSM config.
    pub model_config: Option<PathBuf>,
    /// Local `tokenizer.json` override.
    pub tokenizer: Option<PathBuf>,
    /// Local Mimi `model.safetensors` override.
    pub codec_weights: Option<PathBuf>,

    /// Sampling seed.
    pub seed: u64,
    /// Force CPU execution even when an accelerator probes positive.
    pub cpu: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            model_id: "sesame/csm-1b".to_string(),
            tokenizer_id: "meta-llama/Llama-3.2-1B".to_string(),
            codec_id: "kyutai/mimi".to_string(),
            weights: None,
            model_config: None,
            tokenizer: None,
            codec_weights: None,
            seed: 299792458,
            cpu: false,
        }
    }
}

impl VoiceConfig {
    /// Load a JSON config from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let txt = fs::read_to_string(path)?;
        let cfg: VoiceConfig = serde_json::from_str(&txt)?;
        Ok(cfg)
    }

    /// Save to disk (pretty-printed).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.json");

        let mut cfg = VoiceConfig::default();
        cfg.weights = Some(PathBuf::from("/models/csm/model.safetensors"));
        cfg.cpu = true;
        cfg.save(&path).unwrap();

        let loaded = VoiceConfig::load(&path).unwrap();
        assert_eq!(loaded.model_id, "sesame/csm-1b");
        assert_eq!(loaded.weights, cfg.weights);
        assert!(loaded.cpu);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.json");
        fs::write(&path, r#"{"seed": 7}"#).unwrap();

        let cfg = VoiceConfig::load(&path).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.codec_id, "kyutai/mimi");
    }
}
