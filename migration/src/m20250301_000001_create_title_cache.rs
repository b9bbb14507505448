use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TitleCache::Table)
                    .if_not_exists()
                    .col(string(TitleCache::Collection))
                    .col(string(TitleCache::ImdbId))
                    .col(text(TitleCache::Payload))
                    .col(big_integer(TitleCache::ExpiresAt))
                    .col(big_integer(TitleCache::UpdatedAt))
                    .primary_key(
                        Index::create().col(TitleCache::Collection).col(TitleCache::ImdbId),
                    )
                    .to_owned(),
            )
            .await?;

        // Serves the reaper's range delete.
        manager
            .create_index(
                Index::create()
                    .name("idx_title_cache_expires_at")
                    .table(TitleCache::Table)
                    .col(TitleCache::ExpiresAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TitleCache::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum TitleCache {
    Table,
    Collection,
    ImdbId,
    Payload,
    ExpiresAt,
    UpdatedAt,
}
