//! The structs
//!
/// The parts of the `hostInfo` reply that are used.
///
/// ```text
/// {
///   "system": {
///     "currentTime": ...,
///     "hostname": "db-1.local:27017",
///     "cpuAddrSize": 64,
///     "memSizeMB": 15885,
///     "numCores": 8,
///     "cpuArch": "x86_64",
///     ...
///   },
///   "os": { ... },
///   "extra": { ... },
///   "ok": 1
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HostInfo {
    pub system: HostInfoSystem,
}
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HostInfoSystem {
    pub hostname: String,
    #[serde(rename = "numCores")]
    pub num_cores: i64,
    #[serde(rename = "memSizeMB")]
    pub mem_size_mb: i64,
}
