//! Model asset resolution: local overrides first, Hugging Face hub second.

use avatar_domain::{MediaError, Result};
use hf_hub::api::sync::Api;
use std::path::PathBuf;
use tracing::info;

use crate::config::VoiceConfig;

/// Resolved on-disk locations of every asset the speech service loads.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub weights: PathBuf,
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub codec_weights: PathBuf,
}

/// Resolve all model assets for `config`.
///
/// Local overrides are taken as-is after an existence check; anything not
/// overridden is fetched (or served from cache) via the hub. Every failure
/// maps to `Unavailable` so the service constructor can fail closed.
pub fn resolve(config: &VoiceConfig) -> Result<ModelPaths> {
    let mut api = None;

    let weights = resolve_one(&mut api, &config.weights, &config.model_id, "model.safetensors")?;
    let model_config = resolve_one(&mut api, &config.model_config, &config.model_id, "config.json")?;
    let tokenizer = resolve_one(&mut api, &config.tokenizer, &config.tokenizer_id, "tokenizer.json")?;
    let codec_weights =
        resolve_one(&mut api, &config.codec_weights, &config.codec_id, "model.safetensors")?;

    info!(
        weights = %weights.display(),
        tokenizer = %tokenizer.display(),
        codec = %codec_weights.display(),
        "model assets resolved"
    );

    Ok(ModelPaths {
        weights,
        config: model_config,
        tokenizer,
        codec_weights,
    })
}

fn resolve_one(
    api: &mut Option<Api>,
    local: &Option<PathBuf>,
    repo_id: &str,
    filename: &str,
) -> Result<PathBuf> {
    if let Some(path) = local {
        if !path.exists() {
            return Err(MediaError::Unavailable(format!(
                "configured path {} does not exist",
                path.display()
            )));
        }
        return Ok(path.clone());
    }

    // Lazily construct the hub client so fully-local configs stay offline.
    let api = match api {
        Some(client) => client,
        None => api
            .insert(Api::new().map_err(|e| MediaError::Unavailable(format!("hub client: {e}")))?),
    };
    api.model(repo_id.to_string())
        .get(filename)
        .map_err(|e| MediaError::Unavailable(format!("{repo_id}/{filename}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bogus_local_override_is_unavailable() {
        let mut cfg = VoiceConfig::default();
        cfg.weights = Some(PathBuf::from("/nonexistent/model.safetensors"));

        let err = resolve(&cfg).unwrap_err();
        assert_eq!(err.kind(), avatar_domain::ErrorKind::Unavailable);
        assert!(err.to_string().contains("/nonexistent/model.safetensors"));
    }
}
