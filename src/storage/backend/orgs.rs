use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::{SeaOrmStorage, StorageOp};
use crate::errors::Result;
use crate::stats::{OrgDirectory, OrgRef};
use migration::entities::org;

fn to_ref(model: org::Model) -> OrgRef {
    OrgRef {
        id: model.id,
        name: model.name,
    }
}

#[async_trait]
impl OrgDirectory for SeaOrmStorage {
    async fn list_active(&self) -> Result<Vec<OrgRef>> {
        let db = &self.db;
        let models = self
            .retry(StorageOp::ListActiveOrgs, || async move {
                org::Entity::find()
                    .filter(org::Column::IsActive.eq(true))
                    .order_by_asc(org::Column::Id)
                    .all(db)
                    .await
            })
            .await?;

        Ok(models.into_iter().map(to_ref).collect())
    }

    async fn find_active(&self, org_id: i64) -> Result<Option<OrgRef>> {
        let db = &self.db;
        let model = self
            .retry(StorageOp::FindActiveOrg, || async move {
                org::Entity::find_by_id(org_id)
                    .filter(org::Column::IsActive.eq(true))
                    .one(db)
                    .await
            })
            .await?;

        Ok(model.map(to_ref))
    }
}
