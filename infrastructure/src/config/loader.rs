//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

const APP_DIR: &str = "research-agent";
const PROJECT_FILES: [&str; 2] = ["research-agent.toml", ".research-agent.toml"];
const ENV_PREFIX: &str = "RESEARCH_AGENT_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `RESEARCH_AGENT_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./research-agent.toml` or `./.research-agent.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/research-agent/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/research-agent/config.toml`, or the platform
    /// equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config sources in priority order (for --show-config)
    pub fn describe_sources(config_path: Option<&PathBuf>) -> Vec<String> {
        let mark = |found: bool| if found { "[FOUND]" } else { "[     ]" };
        let mut lines = Vec::new();

        lines.push(format!("  [     ] Env:     {}<SECTION>__<KEY>", ENV_PREFIX));

        if let Some(path) = config_path {
            lines.push(format!("  {} Explicit: {}", mark(path.exists()), path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  {} Project: {}", mark(true), path.display())),
            None => lines.push(format!(
                "  {} Project: ./{} or ./{}",
                mark(false),
                PROJECT_FILES[0],
                PROJECT_FILES[1]
            )),
        }

        if let Some(path) = Self::global_config_path() {
            lines.push(format!("  {} Global:  {}", mark(path.exists()), path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.driver.max_steps, 200);
        assert!(config.output.color);
    }

    #[test]
    fn test_global_config_path_names_app_dir() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.to_string_lossy().contains(APP_DIR));
            assert!(path.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_explicit_file_merges_over_defaults() {
        figment::Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", dir);
            jail.create_file(
                "custom.toml",
                "[gates]\nmin_overall_quality = 0.9\n\n[driver]\nmax_restarts = 2\n",
            )?;

            let path = PathBuf::from("custom.toml");
            let config = ConfigLoader::load(Some(&path)).map_err(|e| *e)?;
            assert_eq!(config.gates.min_overall_quality, 0.9);
            assert_eq!(config.gates.min_claim_verification, 0.6);
            assert_eq!(config.driver.max_restarts, 2);
            assert_eq!(config.driver.max_steps, 200);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_type_errors_are_reported() {
        figment::Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", dir);
            jail.create_file("broken.toml", "[driver]\nmax_steps = \"lots\"\n")?;
            assert!(ConfigLoader::load(Some(&PathBuf::from("broken.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("research-agent.toml", "[driver]\nmax_steps = 40\n")?;
            jail.set_env("RESEARCH_AGENT_DRIVER__MAX_RESTARTS", "3");
            jail.set_env("RESEARCH_AGENT_GATES__MIN_OVERALL_QUALITY", "0.85");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.driver.max_steps, 40);
            assert_eq!(config.driver.max_restarts, 3);
            assert_eq!(config.gates.min_overall_quality, 0.85);
            Ok(())
        });
    }

    #[test]
    fn test_describe_sources_lists_defaults_last() {
        let lines = ConfigLoader::describe_sources(None);
        assert!(lines.last().unwrap().contains("built-in defaults"));
        assert!(lines[0].contains(ENV_PREFIX));
    }
}
