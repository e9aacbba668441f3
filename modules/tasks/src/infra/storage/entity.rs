use anyhow::anyhow;
use sea_orm::entity::prelude::*;

use crate::contract::model::{Priority, Task};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub due_date: DateTimeUtc,
    pub priority: String,
    pub completed: bool,
    pub user_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Task {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let priority: Priority = m
            .priority
            .parse()
            .map_err(|e: String| anyhow!("corrupt priority column: {}", e))?;
        Ok(Task {
            id: m.id,
            title: m.title,
            description: m.description,
            due_date: m.due_date,
            priority,
            completed: m.completed,
            user_id: m.user_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}
