//! Resolve configuration and data directories for `docket`.
//!
//! The helpers in this module respect environment overrides while falling back
//! to platform-appropriate locations provided by the `directories` crate.

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "albo";
const APPLICATION: &str = "docket";

const CONFIG_DIR_ENV: &str = "DOCKET_CONFIG_DIR";
const DATA_DIR_ENV: &str = "DOCKET_DATA_DIR";

fn project_dirs() -> Result<ProjectDirs> {
	ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
		.ok_or_else(|| anyhow!("unable to determine project directories for docket"))
}

/// Resolve an override directory from an environment variable.
///
/// An empty string is treated the same as an unset value.
fn dir_from_env(name: &str) -> Option<PathBuf> {
	let value = env::var_os(name)?;
	if value.is_empty() {
		None
	} else {
		Some(PathBuf::from(value))
	}
}

/// Directory holding `config.toml`.
pub fn get_config_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(CONFIG_DIR_ENV) {
		return Ok(dir);
	}

	Ok(project_dirs()?.config_local_dir().to_path_buf())
}

/// Directory for the interactive log file.
pub fn get_data_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(DATA_DIR_ENV) {
		return Ok(dir);
	}

	Ok(project_dirs()?.data_local_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_override_is_ignored() {
		// SAFETY: the variable is unique to this test.
		unsafe {
			env::set_var("DOCKET_TEST_EMPTY_DIR", "");
		}
		assert_eq!(dir_from_env("DOCKET_TEST_EMPTY_DIR"), None);
		assert_eq!(dir_from_env("DOCKET_TEST_UNSET_DIR"), None);
	}

	#[test]
	fn override_is_used_verbatim() {
		// SAFETY: the variable is unique to this test.
		unsafe {
			env::set_var("DOCKET_TEST_SET_DIR", "/tmp/docket-test");
		}
		assert_eq!(
			dir_from_env("DOCKET_TEST_SET_DIR"),
			Some(PathBuf::from("/tmp/docket-test"))
		);
	}
}
