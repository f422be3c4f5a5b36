//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use tracing::warn;

use crate::models::DEFAULT_LANGUAGE;

/// Pipeline knobs. All fields have defaults via [`PipelineConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Language used when a request names none.
    pub default_language: String,
    /// Deadline for each port call; `None` waits indefinitely.
    pub stage_timeout: Option<Duration>,
    /// Keep the artifacts of completed stages on an error result.
    pub surface_partial_artifacts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            stage_timeout: None,
            surface_partial_artifacts: false,
        }
    }
}

impl PipelineConfig {
    /// Reads `PIPELINE_DEFAULT_LANGUAGE`, `PIPELINE_STAGE_TIMEOUT_SECS` (0 = none)
    /// and `PIPELINE_SURFACE_PARTIAL_ARTIFACTS`. Unparsable values fall back to
    /// the default with a warning.
    ///
    /// # Example
    /// ```
    /// # use lesson_pipeline::cfg::PipelineConfig;
    /// let cfg = PipelineConfig::from_env();
    /// assert!(!cfg.default_language.is_empty());
    /// ```
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`PipelineConfig::from_env`], reading variables through `get`.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dflt = Self::default();

        let default_language = get("PIPELINE_DEFAULT_LANGUAGE")
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or(dflt.default_language);

        let stage_timeout = match parse::<_, u64>(&get, "PIPELINE_STAGE_TIMEOUT_SECS", 0) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let surface_partial_artifacts = get("PIPELINE_SURFACE_PARTIAL_ARTIFACTS")
            .map(|v| as_bool("PIPELINE_SURFACE_PARTIAL_ARTIFACTS", &v, dflt.surface_partial_artifacts))
            .unwrap_or(dflt.surface_partial_artifacts);

        Self {
            default_language,
            stage_timeout,
            surface_partial_artifacts,
        }
    }
}

fn parse<F, T>(get: &F, k: &str, dflt: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!(var = k, value = %v, "invalid value, using default");
            dflt
        }),
        None => dflt,
    }
}

fn as_bool(k: &str, v: &str, dflt: bool) -> bool {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" | "" => false,
        _ => {
            warn!(var = k, value = %v, "invalid boolean, using default");
            dflt
        }
    }
}
