pub mod client;
pub mod error;
pub mod model;

pub use client::TasksApi;
pub use error::TasksError;
pub use model::{NewTask, Priority, Stamp, Task, TaskPatch, TaskRecord, TaskSnapshot};
