/// Resource collections exposed by the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Point,
    Task,
    DifferStack,
    Agent,
    Graph,
    Volume,
}

impl Datatype {
    /// Path segment under the queue base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Datatype::Point => "points",
            Datatype::Task => "tasks",
            Datatype::DifferStack => "differstacks",
            Datatype::Agent => "agents",
            Datatype::Graph => "graphs",
            Datatype::Volume => "volumes",
        }
    }

    /// Columns of an empty result table.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Datatype::Point => &[
                "__v",
                "active",
                "author",
                "coordinate",
                "resolution",
                "created",
                "metadata",
                "namespace",
                "submitted",
                "type",
                "agents_status",
            ],
            Datatype::Task => &[
                "__v",
                "active",
                "assignee",
                "author",
                "closed",
                "created",
                "instructions",
                "metadata",
                "namespace",
                "opened",
                "priority",
                "duration",
                "points",
                "status",
                "seg_id",
                "tags",
                "ng_state",
            ],
            Datatype::DifferStack => &["active", "task_id", "differ_stack"],
            Datatype::Agent => &[
                "active",
                "endpoint",
                "seg_id",
                "nucleus_id",
                "merges",
                "metadata",
                "created",
                "namespace",
            ],
            Datatype::Graph => &[
                "active",
                "author",
                "decisions",
                "metadata",
                "namespace",
                "parent",
                "structure",
                "submitted",
                "volume",
                "graph",
            ],
            Datatype::Volume => &[
                "__v",
                "active",
                "author",
                "bounds",
                "metadata",
                "name",
                "namespace",
                "resolution",
                "uri",
            ],
        }
    }

    /// Whether `field` is a known column of this datatype.
    pub fn has_column(&self, field: &str) -> bool {
        self.columns().contains(&field)
    }
}
