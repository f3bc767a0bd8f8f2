//! Undirected graphs in node-link form
//!
//! Graphs travel as `{"nodes": [{"id": .., ..}], "links": [{"source": ..,
//! "target": ..}]}`. Node ids may be strings or numbers; they are kept as
//! JSON values and compared by their JSON text.

use std::collections::{HashMap, HashSet};

use queue_client::{Error, Result};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Value,
    /// Every field of the node record except `id`.
    pub attributes: Map<String, Value>,
}

impl Node {
    pub fn coordinate(&self) -> Option<&Value> {
        self.attributes.get("coordinate")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<(Value, Value)>,
    edge_keys: HashSet<(String, String)>,
}

fn key_of(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn edge_key(a: &Value, b: &Value) -> (String, String) {
    let (a, b) = (key_of(a), key_of(b));
    if a <= b { (a, b) } else { (b, a) }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, merging attributes into an existing node with the same id.
    pub fn add_node(&mut self, id: impl Into<Value>, attributes: Map<String, Value>) {
        let id = id.into();
        let key = key_of(&id);
        match self.index.get(&key) {
            Some(&position) => self.nodes[position].attributes.extend(attributes),
            None => {
                self.index.insert(key, self.nodes.len());
                self.nodes.push(Node { id, attributes });
            }
        }
    }

    /// Add an undirected edge. Unknown endpoints become attribute-less
    /// nodes; a repeated edge is ignored.
    pub fn add_edge(&mut self, source: impl Into<Value>, target: impl Into<Value>) {
        let (source, target) = (source.into(), target.into());
        for id in [&source, &target] {
            if !self.index.contains_key(&key_of(id)) {
                self.add_node(id.clone(), Map::new());
            }
        }
        if self.edge_keys.insert(edge_key(&source, &target)) {
            self.edges.push((source, target));
        }
    }

    pub fn node(&self, id: &Value) -> Option<&Node> {
        self.index.get(&key_of(id)).map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(Value, Value)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, a: &Value, b: &Value) -> bool {
        self.edge_keys.contains(&edge_key(a, b))
    }

    /// Ids adjacent to `id`, in edge insertion order.
    pub fn neighbors(&self, id: &Value) -> Vec<&Value> {
        let key = key_of(id);
        self.edges
            .iter()
            .filter_map(|(a, b)| {
                if key_of(a) == key {
                    Some(b)
                } else if key_of(b) == key {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Rebuild from a node-link `structure`. Nodes need an `id` (or `_id`);
    /// `links` may be absent.
    pub fn from_node_link(structure: &Value) -> Result<Self> {
        let nodes = structure
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Decode("graph structure has no nodes array".into()))?;

        let mut graph = Graph::new();
        for (position, node) in nodes.iter().enumerate() {
            let Value::Object(fields) = node else {
                return Err(Error::Decode(format!("graph node {position} is not an object")));
            };
            let mut attributes = fields.clone();
            let id = attributes
                .remove("id")
                .or_else(|| fields.get("_id").cloned())
                .ok_or_else(|| Error::Decode(format!("graph node {position} has no id")))?;
            graph.add_node(id, attributes);
        }

        let links = structure
            .get("links")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (position, link) in links.iter().enumerate() {
            match (link.get("source"), link.get("target")) {
                (Some(source), Some(target)) => graph.add_edge(source.clone(), target.clone()),
                _ => {
                    return Err(Error::Decode(format!(
                        "graph link {position} needs source and target"
                    )));
                }
            }
        }
        Ok(graph)
    }

    /// Node-link form accepted by the queue.
    pub fn to_node_link(&self) -> Value {
        let nodes: Vec<Value> = self
            .nodes
            .iter()
            .map(|node| {
                let mut fields = node.attributes.clone();
                fields.insert("id".into(), node.id.clone());
                Value::Object(fields)
            })
            .collect();
        let links: Vec<Value> = self
            .edges
            .iter()
            .map(|(source, target)| json!({"source": source, "target": target}))
            .collect();
        json!({
            "directed": false,
            "multigraph": false,
            "graph": {},
            "nodes": nodes,
            "links": links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure() -> Value {
        json!({
            "directed": false,
            "nodes": [
                {"id": 1, "coordinate": [1, 2, 3], "type": "soma"},
                {"id": 2, "coordinate": [4, 5, 6]},
                {"_id": "n3", "coordinate": [7, 8, 9]},
            ],
            "links": [
                {"source": 1, "target": 2},
                {"source": 2, "target": 1},
                {"source": 2, "target": "n3"},
            ],
        })
    }

    #[test]
    fn node_link_structure_is_rebuilt() {
        let graph = Graph::from_node_link(&structure()).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2, "reverse duplicate is one undirected edge");
        assert!(graph.has_edge(&json!(2), &json!(1)));
        assert_eq!(graph.neighbors(&json!(2)), vec![&json!(1), &json!("n3")]);

        let soma = graph.node(&json!(1)).unwrap();
        assert_eq!(soma.attributes.get("type"), Some(&json!("soma")));
        assert_eq!(soma.coordinate(), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn links_may_introduce_nodes() {
        let graph = Graph::from_node_link(&json!({
            "nodes": [{"id": "a"}],
            "links": [{"source": "a", "target": "b"}],
        }))
        .unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node(&json!("b")).unwrap().attributes.is_empty());
    }

    #[test]
    fn malformed_structures_are_rejected() {
        for bad in [
            json!({}),
            json!({"nodes": [{"coordinate": [0, 0, 0]}]}),
            json!({"nodes": [1]}),
            json!({"nodes": [{"id": 1}], "links": [{"source": 1}]}),
        ] {
            let err = Graph::from_node_link(&bad).unwrap_err();
            assert!(matches!(err, Error::Decode(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn node_link_output_reads_back_identically() {
        let mut graph = Graph::new();
        let mut attrs = Map::new();
        attrs.insert("coordinate".into(), json!([1, 1, 1]));
        graph.add_node("x", attrs.clone());
        graph.add_node("y", attrs);
        graph.add_edge("x", "y");

        let again = Graph::from_node_link(&graph.to_node_link()).unwrap();
        assert_eq!(again.nodes(), graph.nodes());
        assert_eq!(again.edges(), graph.edges());
    }
}
