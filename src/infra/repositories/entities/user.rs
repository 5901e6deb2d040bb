//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ScopeSet, User};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    /// Canonical JSON array of scope names (see `ScopeSet` codec)
    pub scopes: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft expiry timestamp (NULL = active, set = expired)
    pub expire_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::jogging_result::Entity")]
    JoggingResults,
}

impl Related<super::jogging_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JoggingResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity; fails on a corrupt scope column.
impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let scopes = ScopeSet::decode(&model.scopes)?;
        Ok(User::from_storage(
            model.id,
            model.username,
            model.password_hash,
            scopes,
            model.email,
            model.name,
            model.created_at,
            model.updated_at,
            model.expire_date,
        ))
    }
}
