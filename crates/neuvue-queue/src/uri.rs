//! Volume URIs
//!
//! `bossdb://collection/experiment/channel` is split into its parts; any
//! other scheme is kept whole.

use queue_client::{Error, Result};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeUri {
    BossDb {
        collection: String,
        experiment: String,
        channel: String,
    },
    Other(String),
}

impl VolumeUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let Some((scheme, rest)) = uri.split_once("://") else {
            return Err(Error::Validation(format!("URI [{uri}] is malformed")));
        };
        if scheme != "bossdb" {
            return Ok(VolumeUri::Other(uri.to_string()));
        }

        // The last three path segments; anything before them is ignored.
        let mut segments = rest.rsplit('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(channel), Some(experiment), Some(collection)) => Ok(VolumeUri::BossDb {
                collection: collection.to_string(),
                experiment: experiment.to_string(),
                channel: channel.to_string(),
            }),
            _ => Err(Error::Validation(format!(
                "URI [{uri}] is malformed: expected bossdb://collection/experiment/channel"
            ))),
        }
    }

    /// The unpacked form stored in volume tables.
    pub fn to_value(&self) -> Value {
        match self {
            VolumeUri::BossDb {
                collection,
                experiment,
                channel,
            } => json!({
                "type": "bossdb",
                "collection": collection,
                "experiment": experiment,
                "channel": channel,
            }),
            VolumeUri::Other(uri) => json!({ "URI": uri }),
        }
    }
}

/// Parse and unpack in one step.
pub fn unpack_uri(uri: &str) -> Result<Value> {
    VolumeUri::parse(uri).map(|parsed| parsed.to_value())
}
