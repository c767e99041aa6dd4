use anyhow::{Context, Result, anyhow};
use dbdiff::config::{Config, ConfigBuilder, ConfigInput};
use std::path::Path;

/// Config subcommands
#[derive(Debug, Clone, clap::Subcommand)]
pub enum ConfigCommands {
    /// Get a resolved configuration value
    Get {
        /// Configuration key (e.g., dialect, output.single_stage, quoting.all_names)
        key: String,
    },

    /// List all resolved configuration values
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

pub fn cmd_config(config: &Config, config_file: &Path, subcommand: Option<ConfigCommands>) -> Result<()> {
    match subcommand {
        Some(ConfigCommands::Get { key }) => {
            println!("{}", get_config_value(config, &key)?);
            Ok(())
        }

        Some(ConfigCommands::List { format }) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(config)?),
            }
            Ok(())
        }

        Some(ConfigCommands::Validate) => {
            validate_config_file(config_file)?;
            println!("✅ Configuration file '{}' is valid", config_file.display());
            Ok(())
        }

        None => {
            println!("dbdiff config - Inspect dbdiff configuration");
            println!();
            println!("Usage:");
            println!("  dbdiff config get <KEY>     Get a resolved configuration value");
            println!("  dbdiff config list          List all resolved configuration values");
            println!("  dbdiff config validate      Validate configuration file");
            println!();
            println!("Examples:");
            println!("  dbdiff config get output.single_stage");
            println!("  dbdiff config list --format json");
            Ok(())
        }
    }
}

/// Look up a dotted key in the resolved configuration.
fn get_config_value(config: &Config, key: &str) -> Result<String> {
    let tree = serde_json::to_value(config)?;
    let pointer = format!("/{}", key.replace('.', "/"));
    match tree.pointer(&pointer) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Null) => Ok("(not set)".to_string()),
        Some(value) if !value.is_object() => Ok(value.to_string()),
        _ => Err(anyhow!("Unknown configuration key: {}", key)),
    }
}

fn validate_config_file(config_file: &Path) -> Result<()> {
    if !config_file.exists() {
        return Err(anyhow!(
            "Configuration file '{}' not found",
            config_file.display()
        ));
    }
    let contents = std::fs::read_to_string(config_file)
        .with_context(|| format!("Failed to read {}", config_file.display()))?;
    let input: ConfigInput =
        serde_yaml::from_str(&contents).map_err(|e| anyhow!("Invalid YAML syntax: {}", e))?;
    ConfigBuilder::new().with_file(input).resolve()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdiff::config::DialectKind;

    #[test]
    fn test_get_nested_value() {
        let config = Config::default();
        assert_eq!(get_config_value(&config, "output.single_stage").unwrap(), "false");
        assert_eq!(get_config_value(&config, "output.prefix").unwrap(), "(not set)");
    }

    #[test]
    fn test_get_dialect() {
        let config = Config {
            dialect: DialectKind::Mssql,
            ..Config::default()
        };
        assert_eq!(get_config_value(&config, "dialect").unwrap(), "mssql");
    }

    #[test]
    fn test_unknown_and_section_keys_fail() {
        let config = Config::default();
        assert!(get_config_value(&config, "output.nope").is_err());
        assert!(get_config_value(&config, "output").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbdiff.yaml");
        std::fs::write(&path, "dialect: [not, a, dialect").unwrap();
        assert!(validate_config_file(&path).is_err());

        std::fs::write(&path, "dialect: mssql\noutput:\n  single_stage: true\n").unwrap();
        assert!(validate_config_file(&path).is_ok());
    }
}
