use crate::{
    error::Error,
    filter::RecipeFilter,
    pagination::{Page, PageContext},
    schema::{Id, IngredientSnapshot, Recipe, RecipeDraft, RecipeShort, RecipeUpdate},
};

use sqlx::{Pool, Postgres, QueryBuilder, Transaction};

#[derive(sqlx::FromRow)]
struct RecipeRow {
    #[sqlx(flatten)]
    recipe: Recipe,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    recipe_id: Id,
    #[sqlx(flatten)]
    snapshot: IngredientSnapshot,
}

pub async fn insert_recipe(
    author_id: Id,
    draft: &RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Id, Error> {
    let mut tx = pool.begin().await?;

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(&draft.name)
    .bind(&draft.image)
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .fetch_one(&mut *tx)
    .await?;

    let recipe_id = id.0;
    insert_recipe_tags(recipe_id, &draft.tag_ids, &mut tx).await?;
    insert_recipe_ingredients(recipe_id, &draft.ingredients, &mut tx).await?;

    tx.commit().await?;

    Ok(recipe_id)
}

pub async fn update_recipe(
    recipe_id: Id,
    update: &RecipeUpdate,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "
        UPDATE recipes SET
            name = COALESCE($1, name),
            image = COALESCE($2, image),
            text = COALESCE($3, text),
            cooking_time = COALESCE($4, cooking_time)
        WHERE id = $5
    ",
    )
    .bind(update.name.as_deref())
    .bind(update.image.as_deref())
    .bind(update.text.as_deref())
    .bind(update.cooking_time)
    .bind(recipe_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("No recipe exists with specified id"));
    }

    if let Some(tag_ids) = &update.tag_ids {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        insert_recipe_tags(recipe_id, tag_ids, &mut tx).await?;
    }

    if let Some(ingredients) = &update.ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        insert_recipe_ingredients(recipe_id, ingredients, &mut tx).await?;
    }

    tx.commit().await?;

    Ok(())
}

async fn insert_recipe_tags(
    recipe_id: Id,
    tag_ids: &[Id],
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), Error> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Postgres>::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    query.push_values(tag_ids, |mut row, tag_id| {
        row.push_bind(recipe_id).push_bind(*tag_id);
    });
    query.build().execute(&mut **tx).await?;

    Ok(())
}

async fn insert_recipe_ingredients(
    recipe_id: Id,
    snapshots: &[IngredientSnapshot],
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), Error> {
    if snapshots.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Postgres>::new(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, name, measurement_unit, amount) ",
    );
    query.push_values(snapshots, |mut row, snapshot| {
        row.push_bind(recipe_id)
            .push_bind(snapshot.ingredient_id)
            .push_bind(snapshot.name.to_owned())
            .push_bind(snapshot.measurement_unit.to_owned())
            .push_bind(snapshot.amount);
    });
    query.build().execute(&mut **tx).await?;

    Ok(())
}

/// Snapshots, tag links and relations go with the recipe through `ON DELETE CASCADE`
pub async fn delete_recipe(recipe_id: Id, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_recipe(recipe_id: Id, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn list_recipe_ingredients(
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<IngredientSnapshot>, Error> {
    let rows: Vec<IngredientSnapshot> = sqlx::query_as(
        "
        SELECT ingredient_id, name, measurement_unit, amount
        FROM recipe_ingredients
        WHERE recipe_id = $1
        ORDER BY id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn fetch_recipes(
    filter: &RecipeFilter,
    page: Page,
    pool: &Pool<Postgres>,
) -> Result<PageContext<Recipe>, Error> {
    let mut query =
        QueryBuilder::<Postgres>::new("SELECT r.*, COUNT(*) OVER() AS count FROM recipes r");
    filter.push_where(&mut query);
    query
        .push(" ORDER BY r.id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);

    log::debug!("Recipe listing query: {}", query.sql());

    let rows: Vec<RecipeRow> = query.build_query_as().fetch_all(pool).await?;

    let total_count = rows.first().map(|row| row.count).unwrap_or(0);
    let recipes = rows.into_iter().map(|row| row.recipe).collect();

    Ok(PageContext::from_rows(recipes, total_count, page))
}

pub async fn list_author_recipes(
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeShort>, Error> {
    let rows: Vec<RecipeShort> = sqlx::query_as(
        "SELECT id, name, image, cooking_time FROM recipes WHERE author_id = $1 ORDER BY id DESC",
    )
    .bind(author_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_author_recipes(author_id: Id, pool: &Pool<Postgres>) -> Result<i64, Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}

pub async fn list_cart_ingredients(
    user_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<Vec<IngredientSnapshot>>, Error> {
    let rows: Vec<CartRow> = sqlx::query_as(
        "
        SELECT ri.recipe_id, ri.ingredient_id, ri.name, ri.measurement_unit, ri.amount
        FROM shopping_cart c
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        WHERE c.user_id = $1
        ORDER BY ri.recipe_id DESC, ri.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    // rows arrive grouped by recipe
    let mut recipes: Vec<(Id, Vec<IngredientSnapshot>)> = Vec::new();
    for row in rows {
        match recipes.last_mut() {
            Some((recipe_id, snapshots)) if *recipe_id == row.recipe_id => {
                snapshots.push(row.snapshot)
            }
            _ => recipes.push((row.recipe_id, vec![row.snapshot])),
        }
    }

    Ok(recipes.into_iter().map(|(_, snapshots)| snapshots).collect())
}
