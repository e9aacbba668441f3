use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_tasks::Migration)]
    }
}

mod m20250301_000001_create_tasks {
    use sea_orm_migration::prelude::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tasks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tasks::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Tasks::Title).string().not_null())
                        .col(ColumnDef::new(Tasks::Description).text().not_null())
                        .col(
                            ColumnDef::new(Tasks::DueDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Tasks::Priority).string().not_null())
                        .col(ColumnDef::new(Tasks::Completed).boolean().not_null())
                        .col(ColumnDef::new(Tasks::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(Tasks::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Tasks::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // The standing query filters by owner and orders by due date.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tasks_user_due")
                        .table(Tasks::Table)
                        .col(Tasks::UserId)
                        .col(Tasks::DueDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tasks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tasks {
        Table,
        Id,
        Title,
        Description,
        DueDate,
        Priority,
        Completed,
        UserId,
        CreatedAt,
        UpdatedAt,
    }
}
