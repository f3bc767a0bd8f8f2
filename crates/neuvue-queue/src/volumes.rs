//! Volume accessors

use queue_client::{ApiRequest, Result};
use serde_json::{Map, Value, json};

use crate::client::{ListOptions, NeuvueQueue};
use crate::datatype::Datatype;
use crate::table::Table;
use crate::uri::{VolumeUri, unpack_uri};

/// A volume to insert.
#[derive(Debug, Clone)]
pub struct NewVolume {
    pub name: String,
    pub uri: String,
    /// `[[x0, y0, z0], [x1, y1, z1]]`
    pub bounds: [[i64; 3]; 2],
    pub resolution: i64,
    pub author: String,
    pub namespace: String,
    pub metadata: Map<String, Value>,
}

impl NeuvueQueue {
    pub async fn get_volume(&mut self, volume_id: &str) -> Result<Value> {
        self.send_json(ApiRequest::get(format!("/volumes/{volume_id}")), || {
            format!("unable to get volume {volume_id}")
        })
        .await
    }

    /// List volumes; each `uri` is replaced with its unpacked form.
    /// A stored URI that cannot be unpacked is left as-is.
    pub async fn get_volumes(&mut self, options: ListOptions) -> Result<Table> {
        let query = self.page_query(Datatype::Volume, options);
        let mut table = self.list(Datatype::Volume, query, "unable to get volumes").await?;
        table.map_column("uri", |value| {
            value
                .as_str()
                .and_then(|uri| unpack_uri(uri).ok())
                .unwrap_or_else(|| value.clone())
        });
        Ok(table)
    }

    /// Insert a volume. The URI must carry a scheme.
    pub async fn post_volume(&mut self, volume: &NewVolume) -> Result<Value> {
        VolumeUri::parse(&volume.uri)?;
        let body = json!({
            "active": true,
            "bounds": volume.bounds,
            "metadata": volume.metadata,
            "author": volume.author,
            "name": volume.name,
            "namespace": volume.namespace,
            "resolution": volume.resolution,
            "uri": volume.uri,
            "__v": 0,
        });
        self.send_json(ApiRequest::post("/volumes", body), || {
            "unable to post volume".into()
        })
        .await
    }

    pub async fn delete_volume(&mut self, volume_id: &str) -> Result<String> {
        self.send(ApiRequest::delete(format!("/volumes/{volume_id}")), || {
            format!("unable to delete volume {volume_id}")
        })
        .await?;
        Ok(volume_id.to_string())
    }
}
