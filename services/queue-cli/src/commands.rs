//! Command execution against a connected queue

use anyhow::Result;
use neuvue_queue::{Datatype, ListOptions, NeuvueQueue};
use serde_json::{Value, json};

use crate::cli::Command;
use crate::error::Error;

fn datatype_name(datatype: Datatype) -> String {
    datatype.path().to_string()
}

/// Run `command` and return what should be printed on stdout.
pub async fn run(queue: &mut NeuvueQueue, command: Command) -> Result<Value> {
    match command {
        Command::Login => Ok(json!({"status": "logged in"})),
        Command::List {
            datatype,
            sieve,
            limit,
            sort,
            inactive,
        } => {
            let options = ListOptions {
                sieve: sieve.unwrap_or_default(),
                limit,
                sort,
                active_default: !inactive,
                page_size: None,
            };
            let table = match datatype {
                Datatype::Point => queue.get_points(options).await?,
                Datatype::Task => queue.get_tasks(options, false).await?,
                Datatype::DifferStack => queue.get_differ_stacks(options).await?,
                Datatype::Agent => queue.get_agent_jobs(options).await?,
                Datatype::Graph => queue.get_graphs(options, false).await?.table,
                Datatype::Volume => queue.get_volumes(options).await?,
            };
            Ok(Value::Array(table.into_records()))
        }
        Command::Get { datatype, id } => {
            let record = match datatype {
                Datatype::Point => queue.get_point(&id).await?,
                Datatype::Task => queue.get_task(&id, false).await?,
                Datatype::DifferStack => queue.get_differ_stack(&id).await?,
                Datatype::Agent => queue.get_agent_job(&id).await?,
                Datatype::Graph => queue.get_graph(&id, false).await?.record,
                Datatype::Volume => queue.get_volume(&id).await?,
            };
            Ok(record)
        }
        Command::Delete { datatype, id } => {
            let deleted = match datatype {
                Datatype::Task => queue.delete_task(&id).await?,
                Datatype::Agent => queue.delete_agent(&id).await?,
                Datatype::Graph => queue.delete_graph(&id).await?,
                Datatype::Volume => queue.delete_volume(&id).await?,
                Datatype::Point | Datatype::DifferStack => {
                    return Err(Error::Unsupported {
                        command: "delete".into(),
                        datatype: datatype_name(datatype),
                    }
                    .into());
                }
            };
            Ok(json!({ "deleted": deleted }))
        }
        Command::NextTask {
            assignee,
            namespace,
        } => Ok(queue
            .get_next_task(&assignee, &namespace)
            .await?
            .unwrap_or(Value::Null)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use queue_client::testing::{MockBackend, SeenRequest, inline_executor};

    async fn queue_for(backend: &MockBackend) -> NeuvueQueue {
        NeuvueQueue::from_executor(inline_executor(backend).await)
    }

    #[tokio::test]
    async fn list_prints_records_with_ids() {
        let backend = MockBackend::start(|_, seen: &SeenRequest| {
            if seen.query["p"] == "0" {
                (StatusCode::OK, json!([{"_id": "v1", "uri": "s3://b/v"}]))
            } else {
                (StatusCode::OK, json!([]))
            }
        })
        .await;
        let mut queue = queue_for(&backend).await;

        let output = run(
            &mut queue,
            Command::List {
                datatype: Datatype::Volume,
                sieve: None,
                limit: None,
                sort: Some("name".into()),
                inactive: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(output, json!([{"_id": "v1", "uri": {"URI": "s3://b/v"}}]));
        let seen = &backend.requests()[0];
        assert_eq!(seen.path, "/volumes");
        assert_eq!(seen.query["sort"], "name");
        assert_eq!(seen.sieve(), Some(json!({"active": false})));
    }

    #[tokio::test]
    async fn get_and_delete_route_to_resource_paths() {
        let backend = MockBackend::start(|_, seen: &SeenRequest| {
            (StatusCode::OK, json!({"_id": seen.path.clone()}))
        })
        .await;
        let mut queue = queue_for(&backend).await;

        let record = run(
            &mut queue,
            Command::Get {
                datatype: Datatype::Agent,
                id: "a1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(record["_id"], "/agents/a1");

        let deleted = run(
            &mut queue,
            Command::Delete {
                datatype: Datatype::Task,
                id: "t1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(deleted, json!({"deleted": "t1"}));
        assert_eq!(backend.requests()[1].method, "DELETE");
    }

    #[tokio::test]
    async fn delete_points_is_unsupported() {
        let backend = MockBackend::start(|_, _| (StatusCode::OK, json!({}))).await;
        let mut queue = queue_for(&backend).await;

        let err = run(
            &mut queue,
            Command::Delete {
                datatype: Datatype::Point,
                id: "p1".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "`delete` is not supported for points");
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn next_task_prints_null_when_none() {
        let backend = MockBackend::start(|_, _| (StatusCode::OK, json!([]))).await;
        let mut queue = queue_for(&backend).await;

        let output = run(
            &mut queue,
            Command::NextTask {
                assignee: "ada".into(),
                namespace: "split".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output, Value::Null);
    }

    #[tokio::test]
    async fn queue_errors_keep_their_context() {
        let backend =
            MockBackend::start(|_, _| (StatusCode::NOT_FOUND, json!({"message": "missing"}))).await;
        let mut queue = queue_for(&backend).await;

        let err = run(
            &mut queue,
            Command::Get {
                datatype: Datatype::Task,
                id: "t404".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "unable to get task t404");
        let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
        assert!(chain.iter().any(|m| m == "queue returned 404: missing"), "{chain:?}");
    }
}
