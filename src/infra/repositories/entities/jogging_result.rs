//! Jogging-result database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ActivityRecord, Location, WeatherCondition};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jogging_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    /// Distance in meters; `distance` is the external alias for this column
    pub running_distance: i32,
    /// Duration in seconds
    pub time: i32,
    pub latitude: f64,
    pub longitude: f64,
    /// Weather snapshot captured at write time
    pub condition: Json,
    pub iso_week: i32,
    pub iso_year: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity; fails on out-of-range
/// coordinates, which the write paths never produce.
impl TryFrom<Model> for ActivityRecord {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let location = Location::new(model.latitude, model.longitude)?;
        Ok(ActivityRecord {
            id: model.id,
            owner_id: model.user_id,
            date: model.date,
            distance: model.running_distance,
            duration: model.time,
            location,
            condition: WeatherCondition::new(model.condition),
            iso_week: model.iso_week,
            iso_year: model.iso_year,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
