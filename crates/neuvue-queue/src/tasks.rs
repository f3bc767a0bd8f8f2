//! Task accessors
//!
//! Tasks are created `pending` and later patched one field at a time
//! (`status`, `priority`, `metadata`, ...). Time-range filters on
//! `created`/`opened`/`closed` are built with `TimeRange`.

use queue_client::{ApiRequest, Error, PageQuery, Result, Sieve};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::client::{ListOptions, NeuvueQueue};
use crate::datatype::Datatype;
use crate::table::Table;
use crate::time::{decode_timestamp_columns, now_ms};

/// A task to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub author: String,
    pub assignee: String,
    pub priority: i64,
    pub namespace: String,
    pub instructions: Map<String, Value>,
    #[serde(default)]
    pub points: Option<Vec<String>>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub seg_id: Option<String>,
    /// Neuroglancer state, passed through verbatim.
    #[serde(default)]
    pub ng_state: Option<Value>,
    #[serde(rename = "__v", default = "default_version")]
    pub version: i64,
}

fn default_version() -> i64 {
    1
}

impl NewTask {
    pub fn new(
        author: impl Into<String>,
        assignee: impl Into<String>,
        priority: i64,
        namespace: impl Into<String>,
        instructions: Map<String, Value>,
    ) -> Self {
        Self {
            author: author.into(),
            assignee: assignee.into(),
            priority,
            namespace: namespace.into(),
            instructions,
            points: None,
            duration: 0,
            metadata: Map::new(),
            seg_id: None,
            ng_state: None,
            version: default_version(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.priority < 1 {
            return Err(Error::Validation(format!(
                "priority [{}] must be an integer of at least 1",
                self.priority
            )));
        }
        if self.assignee.trim().is_empty() {
            return Err(Error::Validation("assignee must not be empty".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::Validation("namespace must not be empty".into()));
        }
        Ok(())
    }

    /// Insert body: a fresh `pending`, never-opened task.
    fn to_body(&self, created: i64) -> Result<Value> {
        let mut body = serde_json::to_value(self)
            .map_err(|e| Error::Decode(format!("encoding task: {e}")))?;
        if let Value::Object(fields) = &mut body {
            fields.insert("active".into(), json!(true));
            fields.insert("status".into(), json!("pending"));
            fields.insert("opened".into(), Value::Null);
            fields.insert("closed".into(), Value::Null);
            fields.insert("created".into(), json!(created));
        }
        Ok(body)
    }
}

impl NeuvueQueue {
    pub async fn get_task(&mut self, task_id: &str, populate_points: bool) -> Result<Value> {
        let mut request = ApiRequest::get(format!("/tasks/{task_id}"));
        if populate_points {
            request = request.with_query("populate", "points");
        }
        self.send_json(request, || format!("unable to get task {task_id}"))
            .await
    }

    /// List tasks; `created`, `opened` and `closed` are decoded to RFC 3339.
    pub async fn get_tasks(&mut self, options: ListOptions, populate_points: bool) -> Result<Table> {
        let mut query = self.page_query(Datatype::Task, options);
        if populate_points {
            query = query.with_populate(["points"]);
        }
        let mut table = self.list(Datatype::Task, query, "unable to get tasks").await?;
        decode_timestamp_columns(&mut table, &["created", "opened", "closed"]);
        Ok(table)
    }

    /// The highest-priority open task for `assignee`, else the
    /// highest-priority pending one.
    pub async fn get_next_task(&mut self, assignee: &str, namespace: &str) -> Result<Option<Value>> {
        for status in ["open", "pending"] {
            let sieve = Sieve::new()
                .with("assignee", assignee)
                .with("namespace", namespace)
                .with("active", true)
                .with("status", status);
            let query = PageQuery::new(Datatype::Task.path())
                .with_sieve(sieve)
                .with_sort(["-priority"])
                .with_limit(Some(1))
                .with_page_size(self.page_size());

            let context = format!("unable to get {status} tasks");
            let mut found = self.list_raw(query, &context).await?;
            if !found.is_empty() {
                return Ok(Some(found.swap_remove(0)));
            }
        }
        Ok(None)
    }

    pub async fn post_task(&mut self, task: &NewTask) -> Result<Value> {
        task.validate()?;
        let body = task.to_body(now_ms())?;
        self.send_json(ApiRequest::post("/tasks", body), || {
            "unable to post task".into()
        })
        .await
    }

    /// Post one copy of `task` per assignee in a single request. All copies
    /// share one `created` timestamp; `task.assignee` is ignored.
    pub async fn post_task_broadcast(
        &mut self,
        task: &NewTask,
        assignees: &[String],
    ) -> Result<Value> {
        if assignees.is_empty() {
            return Err(Error::Validation("assignees must not be empty".into()));
        }
        let created = now_ms();
        let mut bodies = Vec::with_capacity(assignees.len());
        for assignee in assignees {
            let copy = NewTask {
                assignee: assignee.clone(),
                version: 0,
                ..task.clone()
            };
            copy.validate()?;
            bodies.push(copy.to_body(created)?);
        }

        self.send_json(ApiRequest::post("/tasks", Value::Array(bodies)), || {
            "unable to post task broadcast".into()
        })
        .await
    }

    /// Patch `fields` with one request per field.
    ///
    /// `metadata` is merged into the stored metadata rather than replacing
    /// it. A `status` change carries `overwrite_opened` when requested so
    /// the queue resets the opened time.
    pub async fn patch_task(
        &mut self,
        task_id: &str,
        fields: Map<String, Value>,
        overwrite_opened: bool,
    ) -> Result<()> {
        if fields.is_empty() {
            warn!(task_id, "patch_task called without fields");
            return Ok(());
        }
        let task = self.get_task(task_id, false).await?;

        for (key, value) in fields {
            if !Datatype::Task.has_column(&key) {
                warn!(task_id, field = %key, "patching a field tasks do not normally have");
            }

            let value = if key == "metadata" {
                merge_metadata(task.get("metadata"), value)
            } else {
                value
            };

            let mut body = Map::new();
            body.insert(key.clone(), value);
            if overwrite_opened && key == "status" {
                body.insert("overwrite_opened".into(), json!(true));
            }

            let request = ApiRequest::patch(format!("/tasks/{task_id}/{key}"), Value::Object(body));
            self.send(request, || format!("unable to patch task {task_id}"))
                .await?;
        }
        Ok(())
    }

    /// Post a copy of task `task_id` with `overrides` applied. The copy
    /// stays in the original namespace; overriding it is rejected.
    pub async fn copy_task(
        &mut self,
        task_id: &str,
        author: Option<&str>,
        overrides: Map<String, Value>,
    ) -> Result<Value> {
        if overrides.contains_key("namespace") {
            return Err(Error::Validation(
                "cannot copy a task and replace its namespace".into(),
            ));
        }

        let Value::Object(mut record) = self.get_task(task_id, false).await? else {
            return Err(Error::Decode(format!("task {task_id} is not an object")).context(
                format!("unable to copy task {task_id}"),
            ));
        };
        record.extend(overrides);
        match author {
            Some(author) => {
                record.insert("author".into(), json!(author));
            }
            None => warn!(task_id, "no author given; the copy keeps the original author"),
        }

        let copy: NewTask = serde_json::from_value(Value::Object(record)).map_err(|e| {
            Error::Decode(format!("task {task_id} cannot be reposted: {e}"))
                .context(format!("unable to copy task {task_id}"))
        })?;
        self.post_task(&copy).await
    }

    pub async fn delete_task(&mut self, task_id: &str) -> Result<String> {
        self.send(ApiRequest::delete(format!("/tasks/{task_id}")), || {
            format!("unable to delete task {task_id}")
        })
        .await?;
        Ok(task_id.to_string())
    }
}

fn merge_metadata(stored: Option<&Value>, update: Value) -> Value {
    match (stored, update) {
        (Some(Value::Object(stored)), Value::Object(update)) => {
            let mut merged = stored.clone();
            merged.extend(update);
            Value::Object(merged)
        }
        (_, update) => update,
    }
}
