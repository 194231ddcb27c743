//! Init command implementation

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use tracing::info;

use reelint_core::LinterConfig;

const DEFAULT_CONFIG: &str = r#"{
  "$schema": "https://reelint.dev/schemas/v1/config.json",
  "analyzer": {
    "model": "gemini-2.5-flash",
    "api_key_env": "GEMINI_API_KEY",
    "timeout_secs": 120
  },
  "scoring": {
    "weights": {
      "hook_strength": 1,
      "structure_pacing": 1,
      "delivery_performance": 1,
      "value_clarity": 1
    }
  },
  "rules": {},
  "cache": {
    "enabled": false
  }
}
"#;

pub fn run_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(LinterConfig::CONFIG_FILES[0]);

    loop {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NOFOLLOW);
        }

        match options.open(&config_path) {
            Ok(mut file) => {
                use std::io::Write;
                file.write_all(DEFAULT_CONFIG.as_bytes()).into_diagnostic()?;
                info!("Created {}", config_path.display());
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !force {
                    return Err(miette::miette!(
                        "Config file already exists. Use --force to overwrite."
                    ));
                }

                match std::fs::remove_file(&config_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_diagnostic(),
                }
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LinterConfig::from_json(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.hash(), LinterConfig::new().hash());
    }
}
