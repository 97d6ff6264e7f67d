use crate::{
    error::Error,
    schema::{Id, Relation},
};

use sqlx::{Pool, Postgres};

pub async fn has_relation(
    relation: Relation,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let table = relation.table();
    let row: Option<(Id,)> = sqlx::query_as(&format!(
        "SELECT recipe_id FROM {table} WHERE user_id = $1 AND recipe_id = $2"
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

pub async fn add_relation(
    relation: Relation,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let table = relation.table();
    let result = sqlx::query(&format!(
        "INSERT INTO {table} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    log::trace!(
        "INSERT INTO {table} ({user_id}, {recipe_id}) wrote {} rows",
        result.rows_affected()
    );

    Ok(result.rows_affected() > 0)
}

pub async fn remove_relation(
    relation: Relation,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let table = relation.table();
    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE user_id = $1 AND recipe_id = $2"
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
