//! Typed views over Cloudflare API envelope results

use serde::Deserialize;

/// A zone as returned by `/zones`.
///
/// Fields are lenient because provisioning only needs the id, the name,
/// and the owning account id; anything the API omits stays empty and is
/// validated by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub account: ZoneAccount,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneAccount {
    #[serde(default)]
    pub id: String,
}

/// A Worker route on a zone
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerRoute {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub script: Option<String>,
}
