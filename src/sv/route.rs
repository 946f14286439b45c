use serde::Deserialize;

use crate::{entity::route_plan, prelude::*};

pub struct Route<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
  pub pharmacy_name: String,
  #[serde(default)]
  pub notes: Option<String>,
}

impl<'a> Route<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Replaces the rep's plan for `date` with `stops`, visited in the given
  /// order.
  pub async fn plan(
    &self,
    rep_id: i32,
    date: Date,
    stops: Vec<Stop>,
  ) -> Result<Vec<route_plan::Model>> {
    if stops.is_empty() {
      return Err(Error::InvalidArgs("A route needs at least one stop".into()));
    }
    if stops.iter().any(|s| s.pharmacy_name.trim().is_empty()) {
      return Err(Error::InvalidArgs("Every stop needs a pharmacy".into()));
    }

    let txn = self.db.begin().await?;

    route_plan::Entity::delete_many()
      .filter(route_plan::Column::RepId.eq(rep_id))
      .filter(route_plan::Column::VisitDate.eq(date))
      .exec(&txn)
      .await?;

    let now = Utc::now().naive_utc();
    let mut planned = Vec::with_capacity(stops.len());
    for (idx, stop) in stops.into_iter().enumerate() {
      let row = route_plan::ActiveModel {
        id: NotSet,
        rep_id: Set(rep_id),
        visit_date: Set(date),
        sequence: Set(idx as i32 + 1),
        pharmacy_name: Set(stop.pharmacy_name.trim().to_string()),
        notes: Set(stop.notes),
        visited: Set(false),
        created_at: Set(now),
      }
      .insert(&txn)
      .await?;
      planned.push(row);
    }

    txn.commit().await?;

    info!("Route for rep {rep_id} on {date}: {} stops", planned.len());
    Ok(planned)
  }

  pub async fn for_rep(
    &self,
    rep_id: i32,
    date: Option<Date>,
  ) -> Result<Vec<route_plan::Model>> {
    let mut query =
      route_plan::Entity::find().filter(route_plan::Column::RepId.eq(rep_id));

    if let Some(date) = date {
      query = query.filter(route_plan::Column::VisitDate.eq(date));
    }

    Ok(
      query
        .order_by_asc(route_plan::Column::VisitDate)
        .order_by_asc(route_plan::Column::Sequence)
        .all(self.db)
        .await?,
    )
  }

  pub async fn get(&self, id: i32) -> Result<route_plan::Model> {
    route_plan::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::RouteNotFound)
  }

  pub async fn mark_visited(&self, id: i32) -> Result<route_plan::Model> {
    let stop = self.get(id).await?;

    Ok(
      route_plan::ActiveModel { visited: Set(true), ..stop.into() }
        .update(self.db)
        .await?,
    )
  }

  pub async fn delete(&self, id: i32) -> Result<()> {
    let result = route_plan::Entity::delete_by_id(id).exec(self.db).await?;

    if result.rows_affected == 0 {
      return Err(Error::RouteNotFound);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  fn stop(name: &str) -> Stop {
    Stop { pharmacy_name: name.into(), notes: None }
  }

  #[tokio::test]
  async fn test_plan_replaces_day() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Route::new(&db);
    let day = Date::from_ymd_opt(2024, 5, 10).unwrap();

    sv.plan(rep.id, day, vec![stop("A"), stop("B")]).await.unwrap();
    let planned =
      sv.plan(rep.id, day, vec![stop("C"), stop("A"), stop("B")])
        .await
        .unwrap();

    assert_eq!(planned.len(), 3);

    let stored = sv.for_rep(rep.id, Some(day)).await.unwrap();
    let names: Vec<_> =
      stored.iter().map(|s| (s.sequence, s.pharmacy_name.as_str())).collect();
    assert_eq!(names, [(1, "C"), (2, "A"), (3, "B")]);
  }

  #[tokio::test]
  async fn test_visit_and_delete() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Route::new(&db);
    let day = Date::from_ymd_opt(2024, 5, 10).unwrap();

    let planned = sv.plan(rep.id, day, vec![stop("A")]).await.unwrap();
    let visited = sv.mark_visited(planned[0].id).await.unwrap();
    assert!(visited.visited);

    sv.delete(planned[0].id).await.unwrap();
    assert!(matches!(
      sv.delete(planned[0].id).await,
      Err(Error::RouteNotFound)
    ));
    assert!(sv.for_rep(rep.id, None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_empty_plan_rejected() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let day = Date::from_ymd_opt(2024, 5, 10).unwrap();

    assert!(matches!(
      Route::new(&db).plan(rep.id, day, vec![]).await,
      Err(Error::InvalidArgs(_))
    ));
  }
}
