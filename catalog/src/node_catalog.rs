use crate::catalog_errors::CatalogError;
use crate::database::Database;
use crate::find_by_name;
use model::asset::{AssetId, AssetKind};
use model::node::gender::{self, Entity as GenderEntity};
use model::node::gender_node;
use model::node::group::{self, CreateGroup, Entity as GroupEntity};
use model::node::{self, CreateNode, Entity as NodeEntity};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

/// Groups, nodes and the gender tags attached to nodes.
pub struct NodeCatalog {
    db: Database,
}

impl NodeCatalog {
    pub fn from(db: Database) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn create_group(&self, req: CreateGroup) -> Result<group::Model, CatalogError> {
        group::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_group(&self, name: &str) -> Result<group::Model, CatalogError> {
        find_by_name::<GroupEntity>(&self.db.conn, AssetKind::Group, group::Column::Name, name)
            .await
    }

    pub async fn create_node(&self, req: CreateNode) -> Result<node::Model, CatalogError> {
        node::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_node(&self, name: &str) -> Result<node::Model, CatalogError> {
        find_by_name::<NodeEntity>(&self.db.conn, AssetKind::Node, node::Column::Name, name).await
    }

    /// Returns the gender with this name, creating it on first use. The flag
    /// tells whether it was created by this call.
    pub async fn find_or_create_gender(
        &self,
        name: &str,
    ) -> Result<(gender::Model, bool), CatalogError> {
        if let Some(existing) = GenderEntity::find()
            .filter(gender::Column::Name.eq(name))
            .one(&self.db.conn)
            .await?
        {
            return Ok((existing, false));
        }

        let created = gender::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await?;
        Ok((created, true))
    }

    pub async fn tag_node(&self, gender_id: AssetId, node_id: AssetId) -> Result<(), CatalogError> {
        gender_node::ActiveModel {
            gender_id: Set(gender_id),
            node_id: Set(node_id),
        }
        .insert(&self.db.conn)
        .await?;
        Ok(())
    }

    pub async fn node_genders(&self, node: &node::Model) -> Result<Vec<gender::Model>, CatalogError> {
        node.find_related(GenderEntity)
            .order_by_asc(gender::Column::Name)
            .all(&self.db.conn)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seed_server;
    use serde_json::json;

    async fn seed_node(db: &Database, name: &str) -> node::Model {
        let catalog = NodeCatalog::from(db.clone());
        let server = seed_server(db, "c1", &format!("{name}-server")).await;
        let group = catalog
            .create_group(CreateGroup {
                name: "nodes".to_string(),
                data: json!({"genders": ["nodes"]}),
            })
            .await
            .unwrap();

        catalog
            .create_node(CreateNode {
                name: name.to_string(),
                data: json!({"genders": ["nodes", "compute"]}),
                server_id: server.id,
                group_id: group.id,
            })
            .await
            .expect("Node creation should succeed")
    }

    #[tokio::test]
    async fn test_find_node_and_group() {
        let db = Database::for_test().await;
        let catalog = NodeCatalog::from(db.clone());
        let node = seed_node(&db, "node01").await;

        assert_eq!(catalog.find_node("node01").await.unwrap(), node);
        assert_eq!(catalog.find_group("nodes").await.unwrap().id, node.group_id);
        assert!(catalog.find_group("login").await.is_err());
    }

    #[tokio::test]
    async fn test_find_or_create_gender() {
        let catalog = NodeCatalog::from(Database::for_test().await);

        let (first, created) = catalog.find_or_create_gender("compute").await.unwrap();
        assert!(created);
        let (second, created) = catalog.find_or_create_gender("compute").await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_tag_node() {
        let db = Database::for_test().await;
        let catalog = NodeCatalog::from(db.clone());
        let node = seed_node(&db, "node01").await;

        for name in ["nodes", "compute"] {
            let (gender, _) = catalog.find_or_create_gender(name).await.unwrap();
            catalog.tag_node(gender.id, node.id).await.unwrap();
        }

        let names: Vec<String> = catalog
            .node_genders(&node)
            .await
            .unwrap()
            .into_iter()
            .map(|gender| gender.name)
            .collect();
        assert_eq!(names, vec!["compute", "nodes"]);

        let (compute, _) = catalog.find_or_create_gender("compute").await.unwrap();
        assert!(
            catalog.tag_node(compute.id, node.id).await.is_err(),
            "Tagging a node twice with the same gender should be rejected"
        );
    }
}
