//! SSH config file updates
//!
//! Rewrites the managed host block in place: existing custom settings are
//! carried over, connection details are replaced, everything else in the
//! file stays untouched.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::parser;
use super::types::{ConnectionParams, HostBlock, DEFAULT_OPTIONS, HOST_ALIAS};

/// Outcome of a config update, for caller-side reporting
#[derive(Debug)]
pub struct UpdateReport {
    /// Path that was written
    pub path: PathBuf,

    /// Whether this run created the config file
    pub created_file: bool,

    /// Whether an existing block for the alias was found and replaced
    pub found_existing: bool,

    /// Number of custom settings carried over from the previous block
    pub preserved: usize,
}

/// Resolve the config file path
///
/// A custom path is tilde-expanded; the default is `~/.ssh/config`.
pub fn config_path(custom: Option<&str>) -> Result<PathBuf> {
    match custom {
        Some(p) => Ok(PathBuf::from(shellexpand::tilde(p).as_ref())),
        None => dirs::home_dir()
            .map(|home| home.join(".ssh").join("config"))
            .context("Could not determine home directory"),
    }
}

/// Rewrite the config file so it carries exactly one up-to-date block for
/// the managed alias
pub fn update(params: &ConnectionParams, custom_path: Option<&str>) -> Result<UpdateReport> {
    let path = config_path(custom_path)?;
    debug!("updating SSH config at {:?}", path);

    let created_file = ensure_file_ready(&path)?;
    let content = load_content(&path);

    let (preserved, remaining) = parser::extract_and_remove_block(&content, HOST_ALIAS);
    let found_existing = remaining != content;
    if found_existing {
        info!(
            "replacing existing '{}' entry, {} custom settings carried over",
            HOST_ALIAS,
            preserved.len()
        );
    }

    let block = build_block(HOST_ALIAS, params, &preserved);
    commit(&remaining, &block, &path)?;

    Ok(UpdateReport {
        path,
        created_file,
        found_existing,
        preserved: preserved.len(),
    })
}

/// Make sure the config file exists with owner-only permissions
///
/// Returns whether the file was created by this call.
fn ensure_file_ready(path: &Path) -> Result<bool> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {:?}", parent))?;
            set_mode(parent, 0o700)?;
            debug!("created directory {:?}", parent);
        }
    }

    if path.exists() {
        return Ok(false);
    }

    fs::File::create(path).context(format!("Failed to create config file: {:?}", path))?;
    set_mode(path, 0o600)?;
    info!("created config file {:?}", path);
    Ok(true)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .context(format!("Failed to restrict permissions on {:?}", path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Read the current config, falling back to empty content on read failure
///
/// The update then proceeds as if the file were empty, so a transient read
/// error ends up discarding existing content on write-back. Known risk,
/// kept from the previous behavior of this tool.
fn load_content(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("failed to read {:?}: {}", path, err);
            eprintln!("Error reading SSH config: {}", err);
            String::new()
        }
    }
}

/// Render the new alias block
///
/// Field order is fixed: the three connection settings, then preserved
/// settings in discovery order, then the defaults that were not overridden.
fn build_block(alias: &str, params: &ConnectionParams, preserved: &HostBlock) -> String {
    let mut entry = format!("Host {}\n", alias);
    entry.push_str(&format!("    HostName {}\n", params.hostname));
    entry.push_str(&format!("    Port {}\n", params.port));
    entry.push_str(&format!("    User {}\n", params.user));

    for (key, value) in preserved.iter() {
        entry.push_str(&format!("    {} {}\n", key, value));
    }

    for (key, default) in DEFAULT_OPTIONS {
        if !preserved.contains(key) {
            entry.push_str(&format!("    {} {}\n", key, default));
        }
    }

    entry
}

/// Append the rebuilt block to the stripped content and write it back
///
/// One blank line separates the block from whatever preceded it. The write
/// replaces the file in place; there is no atomic rename.
fn commit(content: &str, new_block: &str, path: &Path) -> Result<()> {
    let updated = format!("{}\n\n{}", content.trim_end(), new_block);
    fs::write(path, updated).context(format!("Failed to write SSH config: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn params() -> ConnectionParams {
        ConnectionParams::new("ssh4.vast.ai", "26378", "root")
    }

    #[test]
    fn test_build_block_fixed_field_order() {
        let block = build_block(HOST_ALIAS, &params(), &HostBlock::new(HOST_ALIAS));
        insta::assert_snapshot!(block.trim_end(), @r###"
        Host vast
            HostName ssh4.vast.ai
            Port 26378
            User root
            StrictHostKeyChecking no
            UserKnownHostsFile /dev/null
        "###);
    }

    #[test]
    fn test_build_block_preserved_before_defaults() {
        let mut preserved = HostBlock::new(HOST_ALIAS);
        preserved.insert("IdentityFile", "/foo");

        let block = build_block(HOST_ALIAS, &params(), &preserved);
        insta::assert_snapshot!(block.trim_end(), @r###"
        Host vast
            HostName ssh4.vast.ai
            Port 26378
            User root
            IdentityFile /foo
            StrictHostKeyChecking no
            UserKnownHostsFile /dev/null
        "###);
    }

    #[test]
    fn test_build_block_default_suppressed_when_overridden() {
        let mut preserved = HostBlock::new(HOST_ALIAS);
        preserved.insert("StrictHostKeyChecking", "yes");

        let block = build_block(HOST_ALIAS, &params(), &preserved);
        assert_eq!(block.matches("StrictHostKeyChecking").count(), 1);
        assert!(block.contains("    StrictHostKeyChecking yes\n"));
        assert!(block.contains("    UserKnownHostsFile /dev/null\n"));
    }

    #[test]
    fn test_build_block_empty_params_still_written() {
        let empty = ConnectionParams::new("", "", "");
        let block = build_block(HOST_ALIAS, &empty, &HostBlock::new(HOST_ALIAS));
        assert!(block.contains("    HostName \n"));
        assert!(block.contains("    Port \n"));
        assert!(block.contains("    User \n"));
    }

    #[test]
    fn test_commit_trims_trailing_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");

        commit("Host other\n    Port 1\n\n\n", "Host vast\n    Port 2\n", &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Host other\n    Port 1\n\nHost vast\n    Port 2\n");
    }

    #[test]
    fn test_commit_on_empty_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");

        commit("", "Host vast\n    Port 2\n", &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "\n\nHost vast\n    Port 2\n");
    }

    #[test]
    fn test_config_path_custom() {
        let path = config_path(Some("/tmp/ssh_config")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/ssh_config"));
    }

    #[test]
    fn test_config_path_default_under_home() {
        let path = config_path(None).unwrap();
        assert!(path.ends_with(".ssh/config"));
    }

    #[test]
    fn test_config_path_tilde_expansion() {
        let path = config_path(Some("~/custom_ssh_config")).unwrap();
        assert!(!path.to_string_lossy().contains('~'));
        assert!(path.ends_with("custom_ssh_config"));
    }

    #[test]
    fn test_ensure_file_ready_creates_parent_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep").join("config");

        let created = ensure_file_ready(&path).unwrap();
        assert!(created);
        assert!(path.exists());

        // Second call is a no-op.
        assert!(!ensure_file_ready(&path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_file_ready_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("ssh").join("config");
        ensure_file_ready(&path).unwrap();

        let dir_mode = fs::metadata(path.parent().unwrap()).unwrap().permissions().mode();
        let file_mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }

    #[test]
    fn test_update_reports_preserved_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(
            &path,
            "Host vast\n    IdentityFile /foo\n    ForwardAgent yes\n",
        )
        .unwrap();

        let report = update(&params(), path.to_str()).unwrap();
        assert!(report.found_existing);
        assert!(!report.created_file);
        assert_eq!(report.preserved, 2);
    }

    #[test]
    fn test_update_fresh_file_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");

        let report = update(&params(), path.to_str()).unwrap();
        assert!(report.created_file);
        assert!(!report.found_existing);
        assert_eq!(report.preserved, 0);
    }

    proptest! {
        // Whatever the connection parameters look like, the scanner must
        // recognize the block it just built and find nothing left over
        // after removing it.
        #[test]
        fn prop_scanner_consumes_built_block(
            host in "[a-z0-9.-]{1,24}",
            port in "[0-9]{1,5}",
            user in "[a-z][a-z0-9]{0,15}",
        ) {
            let params = ConnectionParams::new(&host, &port, &user);
            let block = build_block(HOST_ALIAS, &params, &HostBlock::new(HOST_ALIAS));

            let (preserved, remaining) = parser::extract_and_remove_block(&block, HOST_ALIAS);
            prop_assert!(remaining.is_empty());
            // Only the two defaults survive as preservable settings.
            prop_assert_eq!(preserved.len(), DEFAULT_OPTIONS.len());
        }
    }
}
