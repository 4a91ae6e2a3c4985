//! Loading row payloads from a file or stdin.

use std::io::Read as _;
use std::path::Path;

use serde_json::Value;
use urbanik_risk::RiskError;

/// Reads and parses a JSON payload from `path`, or from stdin when `path`
/// is `None` or `-`.
pub fn read_payload(path: Option<&Path>) -> Result<Value, RiskError> {
    let contents = match path {
        Some(p) if p != Path::new("-") => {
            log::debug!("Reading rows from {}", p.display());
            std::fs::read_to_string(p)?
        }
        _ => {
            log::debug!("Reading rows from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    Ok(serde_json::from_str(&contents)?)
}
