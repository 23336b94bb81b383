pub use sea_orm_migration::prelude::*;

mod m20180726_000001_inventory;

pub struct Migrator;

#[macro_export]
macro_rules! ensure_not_has_tables {
    ($manager:expr, $( $table:ident ),+) => {
        $(
            if $manager.has_table($table::Table.to_string()).await? {
                return Err(DbErr::Migration(format!(
                    "Table `{}` already exists",
                    $table::Table.to_string()
                )));
            }
        )+
    };
}

#[macro_export]
macro_rules! drop_tables {
    ($manager:expr, $( $table:ident ),+) => {
        $(
            $manager
                .drop_table(
                    sea_orm_migration::prelude::Table::drop()
                        .table($table::Table)
                        .if_exists()
                        .to_owned(),
                )
                .await?;
        )+
    };
}

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20180726_000001_inventory::Migration)]
    }
}
