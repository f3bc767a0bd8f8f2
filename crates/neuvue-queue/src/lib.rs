//! NeuVue queue client
//!
//! Typed accessors for the queue's collections (points, tasks, differ
//! stacks, agent jobs, graphs, volumes) on top of `queue-client`. List
//! accessors depaginate and return a `Table` keyed by record id; single
//! record accessors return the raw JSON record.
//!
//! ```no_run
//! # async fn run() -> queue_client::Result<()> {
//! use neuvue_queue::{ListOptions, NeuvueQueue};
//! use queue_auth::AuthOptions;
//!
//! let mut queue = NeuvueQueue::connect(AuthOptions::new("https://queue.neuvue.io")).await?;
//! let open = queue.get_tasks(ListOptions::new().limit(10), false).await?;
//! println!("{} tasks", open.len());
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod client;
pub mod datatype;
pub mod differ_stacks;
pub mod graph;
pub mod graphs;
pub mod points;
pub mod table;
pub mod tasks;
pub mod time;
pub mod uri;
pub mod validator;
pub mod volumes;

pub use agents::NewAgentJob;
pub use client::{ListOptions, NeuvueQueue};
pub use datatype::Datatype;
pub use graph::{Graph, Node};
pub use graphs::{GraphRecord, GraphTable, NewGraph};
pub use points::NewPoint;
pub use queue_client::{Error, Result, Sieve};
pub use table::{Row, Table};
pub use tasks::NewTask;
pub use time::TimeRange;
pub use uri::{VolumeUri, unpack_uri};
pub use validator::{Minnie65Validator, PointValidator};
pub use volumes::NewVolume;
