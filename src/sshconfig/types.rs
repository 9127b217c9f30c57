//! Core data types for SSH config host entries

/// The alias this tool manages in the SSH client config
pub const HOST_ALIAS: &str = "vast";

/// Setting keys always rewritten from the caller's connection parameters.
/// Values found under these keys in an existing block are discarded.
pub const CONTROLLED_KEYS: [&str; 3] = ["HostName", "Port", "User"];

/// Security-relaxing defaults appended to a rebuilt block, each only when
/// the existing block did not already carry the key.
pub const DEFAULT_OPTIONS: [(&str, &str); 2] = [
    ("StrictHostKeyChecking", "no"),
    ("UserKnownHostsFile", "/dev/null"),
];

/// Connection parameters for the managed host entry
///
/// All three fields are passed through to the config verbatim. The port in
/// particular stays a string: this tool does not validate what ssh itself
/// will reject anyway.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    /// Hostname or IP address
    pub hostname: String,

    /// SSH port
    pub port: String,

    /// SSH username
    pub user: String,
}

impl ConnectionParams {
    /// Create new connection parameters
    pub fn new(hostname: &str, port: &str, user: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            port: port.to_string(),
            user: user.to_string(),
        }
    }
}

/// A parsed `Host` block: alias plus its setting lines in file order
///
/// Keys are case-sensitive as written. On duplicate keys the first
/// occurrence wins.
#[derive(Debug, Clone)]
pub struct HostBlock {
    /// Alias the block is registered under
    pub alias: String,

    settings: Vec<(String, String)>,
}

impl HostBlock {
    /// Create an empty block for an alias
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            settings: Vec::new(),
        }
    }

    /// Record a setting unless the key was already seen
    pub fn insert(&mut self, key: &str, value: &str) {
        if !self.contains(key) {
            self.settings.push((key.to_string(), value.to_string()));
        }
    }

    /// Look up a setting value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.settings.iter().any(|(k, _)| k == key)
    }

    /// Iterate settings in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.settings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of settings
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Check whether the block has no settings
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}
