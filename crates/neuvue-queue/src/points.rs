//! Point accessors

use queue_client::{ApiRequest, Error, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::client::{ListOptions, NeuvueQueue};
use crate::datatype::Datatype;
use crate::table::Table;
use crate::time::{decode_timestamp_columns, now_ms};
use crate::validator::PointValidator;

/// A point to insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewPoint {
    pub coordinate: Vec<i64>,
    pub author: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub point_type: String,
    pub resolution: i64,
    pub metadata: Map<String, Value>,
}

impl NewPoint {
    pub fn new(
        coordinate: Vec<i64>,
        author: impl Into<String>,
        namespace: impl Into<String>,
        point_type: impl Into<String>,
    ) -> Self {
        Self {
            coordinate,
            author: author.into(),
            namespace: namespace.into(),
            point_type: point_type.into(),
            resolution: 0,
            metadata: Map::new(),
        }
    }

    fn validate(&self, validator: &dyn PointValidator) -> Result<()> {
        if self.coordinate.len() != 3 || !validator.validate_point(&self.coordinate) {
            return Err(Error::Validation(format!(
                "validation failed for coordinate {:?}",
                self.coordinate
            )));
        }
        Ok(())
    }

    fn to_body(&self, created: i64) -> Result<Value> {
        let mut body = serde_json::to_value(self)
            .map_err(|e| Error::Decode(format!("encoding point: {e}")))?;
        if let Value::Object(fields) = &mut body {
            fields.insert("active".into(), json!(true));
            fields.insert("created".into(), json!(created));
            fields.insert("__v".into(), json!(0));
        }
        Ok(body)
    }
}

impl NeuvueQueue {
    pub async fn get_point(&mut self, point_id: &str) -> Result<Value> {
        self.send_json(ApiRequest::get(format!("/points/{point_id}")), || {
            format!("unable to get point {point_id}")
        })
        .await
    }

    /// List points; `created` and `submitted` are decoded to RFC 3339.
    pub async fn get_points(&mut self, options: ListOptions) -> Result<Table> {
        let query = self.page_query(Datatype::Point, options);
        let mut table = self.list(Datatype::Point, query, "unable to get points").await?;
        decode_timestamp_columns(&mut table, &["created", "submitted"]);
        Ok(table)
    }

    /// Insert a point. With a validator, the coordinate must have three
    /// components inside its bounds; nothing is sent otherwise.
    pub async fn post_point(
        &mut self,
        point: &NewPoint,
        validator: Option<&dyn PointValidator>,
    ) -> Result<Value> {
        if let Some(validator) = validator {
            point.validate(validator)?;
        }
        let body = point.to_body(now_ms())?;
        self.send_json(ApiRequest::post("/points", body), || {
            "unable to post point".into()
        })
        .await
    }

    /// Set `agents_status`, the only patchable point field.
    pub async fn patch_point(&mut self, point_id: &str, agents_status: Value) -> Result<()> {
        let request = ApiRequest::patch(
            format!("/points/{point_id}/agents_status"),
            json!({ "agents_status": agents_status }),
        );
        self.send(request, || format!("unable to patch point {point_id}"))
            .await?;
        Ok(())
    }
}
