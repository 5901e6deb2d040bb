//! Activity-record repository.
//!
//! Owns the only place where a translated filter expression meets the
//! storage engine: the typed AST is compiled to a SeaORM `Condition` with
//! bound values, and the external `distance` field is rewritten to the
//! internal `running_distance` column. Every write runs in a transaction.

use async_trait::async_trait;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::jogging_result::{self, ActiveModel, Entity as ResultEntity};
use crate::domain::ActivityRecord;
use crate::errors::{AppError, AppResult};
use crate::filter::{CmpOp, Comparison, FilterExpr};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Activity repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Persist a new record.
    async fn create(&self, record: &ActivityRecord) -> AppResult<()>;

    /// Full overwrite of an existing record's non-key fields.
    async fn update(&self, record: &ActivityRecord) -> AppResult<()>;

    /// Fetch a record by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ActivityRecord>>;

    /// Remove a record; a missing row is reported as not-found.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// List an owner's records ordered by ascending date, optionally
    /// restricted by a translated filter, with `LIMIT limit OFFSET offset`.
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        filter: Option<FilterExpr>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<ActivityRecord>>;

    /// All of an owner's records ordered by ascending date, for the weekly
    /// report aggregation.
    async fn list_all_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ActivityRecord>>;
}

/// Concrete implementation of ActivityRepository backed by SeaORM.
pub struct ActivityStore {
    db: DatabaseConnection,
}

impl ActivityStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(record: &ActivityRecord) -> ActiveModel {
    ActiveModel {
        id: Set(record.id),
        user_id: Set(record.owner_id),
        date: Set(record.date),
        running_distance: Set(record.distance),
        time: Set(record.duration),
        latitude: Set(record.location.latitude),
        longitude: Set(record.location.longitude),
        condition: Set(record.condition.as_value().clone()),
        iso_week: Set(record.iso_week),
        iso_year: Set(record.iso_year),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}

/// Compile a translated filter into a parameterized condition tree.
fn filter_condition(expr: &FilterExpr) -> Condition {
    match expr {
        FilterExpr::Cmp(cmp) => Condition::all().add(comparison_expr(cmp)),
        FilterExpr::And(left, right) => Condition::all()
            .add(filter_condition(left))
            .add(filter_condition(right)),
    }
}

fn comparison_expr(cmp: &Comparison) -> SimpleExpr {
    use jogging_result::Column;

    match *cmp {
        // external `date` passes through
        Comparison::Date(op, value) => op_expr(Column::Date, op, value),
        // external `distance` aliases the internal column
        Comparison::Distance(op, value) => op_expr(Column::RunningDistance, op, value),
        // external `time` passes through
        Comparison::Time(op, value) => op_expr(Column::Time, op, value),
    }
}

fn op_expr<C, V>(column: C, op: CmpOp, value: V) -> SimpleExpr
where
    C: ColumnTrait,
    V: Into<sea_orm::Value>,
{
    match op {
        CmpOp::Eq => column.eq(value),
        CmpOp::Ne => column.ne(value),
        CmpOp::Ge => column.gte(value),
        CmpOp::Le => column.lte(value),
    }
}

#[async_trait]
impl ActivityRepository for ActivityStore {
    async fn create(&self, record: &ActivityRecord) -> AppResult<()> {
        let active = to_active(record);

        self.db
            .transaction::<_, (), AppError>(move |txn| {
                Box::pin(async move {
                    active.insert(txn).await.map_err(AppError::from)?;
                    Ok(())
                })
            })
            .await?;

        Ok(())
    }

    async fn update(&self, record: &ActivityRecord) -> AppResult<()> {
        let active = to_active(record);

        self.db
            .transaction::<_, (), AppError>(move |txn| {
                Box::pin(async move {
                    active.update(txn).await.map_err(|e| match e {
                        DbErr::RecordNotUpdated => AppError::NotFound,
                        other => AppError::Database(other),
                    })?;
                    Ok(())
                })
            })
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ActivityRecord>> {
        let result = ResultEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(ActivityRecord::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let rows = self
            .db
            .transaction::<_, u64, AppError>(move |txn| {
                Box::pin(async move {
                    let result = ResultEntity::delete_by_id(id)
                        .exec(txn)
                        .await
                        .map_err(AppError::from)?;
                    Ok(result.rows_affected)
                })
            })
            .await?;

        if rows == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        filter: Option<FilterExpr>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<ActivityRecord>> {
        let mut query = ResultEntity::find().filter(jogging_result::Column::UserId.eq(owner_id));

        if let Some(expr) = filter {
            query = query.filter(filter_condition(&expr));
        }

        let models = query
            .order_by_asc(jogging_result::Column::Date)
            .order_by_asc(jogging_result::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(ActivityRecord::try_from).collect()
    }

    async fn list_all_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ActivityRecord>> {
        let models = ResultEntity::find()
            .filter(jogging_result::Column::UserId.eq(owner_id))
            .order_by_asc(jogging_result::Column::Date)
            .order_by_asc(jogging_result::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(ActivityRecord::try_from).collect()
    }
}
