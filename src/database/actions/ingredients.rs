use crate::{
    error::Error,
    schema::{Id, Ingredient},
};

use sqlx::{Pool, Postgres};

pub async fn get_ingredient(id: Id, pool: &Pool<Postgres>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn list_ingredients(
    name_prefix: Option<&str>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = match name_prefix {
        Some(prefix) => {
            sqlx::query_as("SELECT * FROM ingredients WHERE starts_with(name, $1) ORDER BY id")
                .bind(prefix)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM ingredients ORDER BY id")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}

pub async fn create_ingredient(
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Postgres>,
) -> Result<Id, Error> {
    let id: (Id,) = sqlx::query_as(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_one(pool)
    .await?;

    Ok(id.0)
}

/// Edits the catalog record only. Snapshots already attached to recipes keep their values.
pub async fn update_ingredient(
    id: Id,
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let result =
        sqlx::query("UPDATE ingredients SET name = $1, measurement_unit = $2 WHERE id = $3")
            .bind(name)
            .bind(measurement_unit)
            .bind(id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No ingredient exists with specified id"));
    }

    Ok(())
}
