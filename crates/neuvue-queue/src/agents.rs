//! Agent job accessors

use queue_client::{ApiRequest, Error, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::client::{ListOptions, NeuvueQueue};
use crate::datatype::Datatype;
use crate::table::Table;
use crate::time::now_ms;

/// An agent job to insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewAgentJob {
    pub seg_id: String,
    pub nucleus_id: String,
    pub endpoint: [i64; 3],
    pub merges: Map<String, Value>,
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl NeuvueQueue {
    pub async fn post_agent(&mut self, job: &NewAgentJob) -> Result<Value> {
        let mut body = serde_json::to_value(job)
            .map_err(|e| Error::Decode(format!("encoding agent job: {e}")))?;
        if let Value::Object(fields) = &mut body {
            fields.insert("active".into(), json!(true));
            fields.insert("created".into(), json!(now_ms()));
        }
        self.send_json(ApiRequest::post("/agents", body), || {
            "unable to post agent job".into()
        })
        .await
    }

    pub async fn get_agent_job(&mut self, agent_job_id: &str) -> Result<Value> {
        self.send_json(ApiRequest::get(format!("/agents/{agent_job_id}")), || {
            format!("unable to get agent job {agent_job_id}")
        })
        .await
    }

    pub async fn get_agent_jobs(&mut self, options: ListOptions) -> Result<Table> {
        let query = self.page_query(Datatype::Agent, options);
        self.list(Datatype::Agent, query, "unable to get agent jobs")
            .await
    }

    pub async fn delete_agent(&mut self, agent_job_id: &str) -> Result<String> {
        self.send(ApiRequest::delete(format!("/agents/{agent_job_id}")), || {
            format!("unable to delete agent job {agent_job_id}")
        })
        .await?;
        Ok(agent_job_id.to_string())
    }
}
