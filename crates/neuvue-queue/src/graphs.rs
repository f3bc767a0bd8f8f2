//! Graph accessors
//!
//! Graph records carry a node-link `structure`; reads rebuild it into a
//! `Graph`, writes serialize one.

use std::collections::BTreeMap;

use queue_client::{ApiRequest, Error, Result};
use serde_json::{Value, json};

use crate::client::{ListOptions, NeuvueQueue};
use crate::datatype::Datatype;
use crate::graph::Graph;
use crate::table::Table;
use crate::time::decode_timestamp_columns;

/// One graph record and its rebuilt structure.
#[derive(Debug, Clone)]
pub struct GraphRecord {
    pub record: Value,
    pub graph: Graph,
}

/// Graph list: the table plus the rebuilt graph of every row, keyed by id.
#[derive(Debug, Clone)]
pub struct GraphTable {
    pub table: Table,
    pub graphs: BTreeMap<String, Graph>,
}

/// A graph to insert.
#[derive(Debug, Clone)]
pub struct NewGraph {
    /// Id of the volume the graph lives in.
    pub volume: String,
    pub graph: Graph,
    pub author: String,
    pub namespace: String,
}

fn structure_of(record: &Value) -> Result<Graph> {
    let structure = record
        .get("structure")
        .ok_or_else(|| Error::Decode("graph record has no structure".into()))?;
    Graph::from_node_link(structure)
}

impl NeuvueQueue {
    pub async fn get_graph(&mut self, graph_id: &str, populate_volume: bool) -> Result<GraphRecord> {
        let context = || format!("unable to get graph {graph_id}");
        let mut request = ApiRequest::get(format!("/graphs/{graph_id}"));
        if populate_volume {
            request = request.with_query("populate", "volume");
        }
        let record = self.send_json(request, context).await?;
        let graph = structure_of(&record).map_err(|e| e.context(context()))?;
        Ok(GraphRecord { record, graph })
    }

    /// List graphs; `submitted` is decoded to RFC 3339.
    pub async fn get_graphs(&mut self, options: ListOptions, populate_volume: bool) -> Result<GraphTable> {
        let mut query = self.page_query(Datatype::Graph, options);
        if populate_volume {
            query = query.with_populate(["volume"]);
        }
        let mut table = self.list(Datatype::Graph, query, "unable to get graphs").await?;
        decode_timestamp_columns(&mut table, &["submitted"]);

        let mut graphs = BTreeMap::new();
        for (id, row) in table.iter() {
            let Some(structure) = row.get("structure") else {
                continue;
            };
            let graph = Graph::from_node_link(structure)
                .map_err(|e| e.context(format!("unable to rebuild graph {id}")))?;
            graphs.insert(id.to_string(), graph);
        }
        Ok(GraphTable { table, graphs })
    }

    /// Insert a graph. Every node must have a `coordinate`.
    pub async fn post_graph(&mut self, new_graph: &NewGraph) -> Result<Value> {
        if let Some(node) = new_graph
            .graph
            .nodes()
            .iter()
            .find(|node| node.coordinate().is_none())
        {
            return Err(Error::Validation(format!(
                "all nodes must have a coordinate; node {} does not",
                node.id
            )));
        }

        let body = json!({
            "volume": new_graph.volume,
            "structure": new_graph.graph.to_node_link(),
            "author": new_graph.author,
            "namespace": new_graph.namespace,
            "__v": 0,
        });
        self.send_json(ApiRequest::post("/graphs", body), || {
            "unable to post graph".into()
        })
        .await
    }

    pub async fn delete_graph(&mut self, graph_id: &str) -> Result<String> {
        self.send(ApiRequest::delete(format!("/graphs/{graph_id}")), || {
            format!("unable to delete graph {graph_id}")
        })
        .await?;
        Ok(graph_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client_for;
    use axum::http::StatusCode;
    use queue_client::testing::{MockBackend, SeenRequest};
    use serde_json::Map;

    fn stored_graph(id: &str) -> Value {
        json!({
            "_id": id,
            "volume": "v1",
            "submitted": 1000,
            "structure": {
                "nodes": [
                    {"id": 0, "coordinate": [1, 1, 1]},
                    {"id": 1, "coordinate": [2, 2, 2]},
                ],
                "links": [{"source": 0, "target": 1}],
            },
        })
    }

    #[tokio::test]
    async fn get_graph_rebuilds_structure() {
        let backend = MockBackend::start(|_, _| (StatusCode::OK, stored_graph("g1"))).await;
        let mut client = client_for(&backend).await;

        let fetched = client.get_graph("g1", true).await.unwrap();
        assert_eq!(fetched.graph.node_count(), 2);
        assert!(fetched.graph.has_edge(&json!(1), &json!(0)));
        assert_eq!(backend.requests()[0].query["populate"], "volume");
    }

    #[tokio::test]
    async fn get_graphs_returns_table_and_graphs() {
        let backend = MockBackend::start(|_, seen: &SeenRequest| {
            if seen.query["p"] == "0" {
                (StatusCode::OK, json!([stored_graph("g1"), stored_graph("g2")]))
            } else {
                (StatusCode::OK, json!([]))
            }
        })
        .await;
        let mut client = client_for(&backend).await;

        let listed = client.get_graphs(ListOptions::new(), false).await.unwrap();
        assert_eq!(listed.table.len(), 2);
        assert_eq!(listed.graphs.len(), 2);
        assert_eq!(listed.graphs["g2"].edge_count(), 1);
        assert_eq!(
            listed.table.cell("g1", "submitted"),
            Some(&json!("1970-01-01T00:00:01.000Z"))
        );
    }

    #[tokio::test]
    async fn post_graph_requires_coordinates() {
        let backend =
            MockBackend::start(|_, seen: &SeenRequest| (StatusCode::OK, seen.body.clone().unwrap()))
                .await;
        let mut client = client_for(&backend).await;

        let mut graph = Graph::new();
        let mut with_coordinate = Map::new();
        with_coordinate.insert("coordinate".into(), json!([5, 5, 5]));
        graph.add_node("a", with_coordinate);
        graph.add_edge("a", "b");

        let mut new_graph = NewGraph {
            volume: "v1".into(),
            graph,
            author: "ada".into(),
            namespace: "proofread".into(),
        };
        let err = client.post_graph(&new_graph).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got: {err:?}");
        assert_eq!(backend.request_count(), 0);

        let mut coordinate = Map::new();
        coordinate.insert("coordinate".into(), json!([6, 6, 6]));
        new_graph.graph.add_node("b", coordinate);
        let posted = client.post_graph(&new_graph).await.unwrap();
        assert_eq!(posted["structure"]["links"], json!([{"source": "a", "target": "b"}]));
        assert_eq!(posted["volume"], "v1");
    }

    #[tokio::test]
    async fn delete_graph_returns_id() {
        let backend = MockBackend::start(|_, _| (StatusCode::OK, json!({}))).await;
        let mut client = client_for(&backend).await;

        assert_eq!(client.delete_graph("g7").await.unwrap(), "g7");
        assert_eq!(backend.requests()[0].path, "/graphs/g7");
    }
}
