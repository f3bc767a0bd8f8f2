//! Differ stack accessors

use queue_client::{ApiRequest, Result};
use serde_json::{Value, json};

use crate::client::{ListOptions, NeuvueQueue};
use crate::datatype::Datatype;
use crate::table::Table;

impl NeuvueQueue {
    pub async fn get_differ_stacks(&mut self, options: ListOptions) -> Result<Table> {
        let query = self.page_query(Datatype::DifferStack, options);
        self.list(Datatype::DifferStack, query, "unable to get differ stacks")
            .await
    }

    pub async fn get_differ_stack(&mut self, differ_stack_id: &str) -> Result<Value> {
        self.send_json(
            ApiRequest::get(format!("/differstacks/{differ_stack_id}")),
            || format!("unable to get differ stack {differ_stack_id}"),
        )
        .await
    }

    /// Attach a stack of edit states to `task_id`.
    pub async fn post_differ_stack(&mut self, task_id: &str, differ_stack: Vec<Value>) -> Result<Value> {
        let body = json!({
            "active": true,
            "task_id": task_id,
            "differ_stack": differ_stack,
        });
        self.send_json(ApiRequest::post("/differstacks", body), || {
            "unable to post differ stack".into()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client_for;
    use axum::http::StatusCode;
    use queue_client::testing::{MockBackend, SeenRequest};

    #[tokio::test]
    async fn differ_stacks_round_trip_through_endpoints() {
        let backend = MockBackend::start(|_, seen: &SeenRequest| match seen.method.as_str() {
            "POST" => (StatusCode::CREATED, seen.body.clone().unwrap()),
            _ if seen.path == "/differstacks" => (StatusCode::OK, json!([])),
            _ => (StatusCode::OK, json!({"_id": "d1", "task_id": "t1"})),
        })
        .await;
        let mut client = client_for(&backend).await;

        let posted = client
            .post_differ_stack("t1", vec![json!({"state": 1}), json!({"state": 2})])
            .await
            .unwrap();
        assert_eq!(posted["active"], true);
        assert_eq!(posted["differ_stack"].as_array().unwrap().len(), 2);

        let one = client.get_differ_stack("d1").await.unwrap();
        assert_eq!(one["task_id"], "t1");

        let table = client.get_differ_stacks(ListOptions::new()).await.unwrap();
        assert_eq!(table.columns(), ["active", "task_id", "differ_stack"]);
        assert_eq!(backend.requests()[1].path, "/differstacks/d1");
    }
}
