use crate::{
    error::Error,
    schema::{
        ComposedRecipe, Id, IngredientAmount, IngredientSnapshot, NewRecipe, Recipe,
        RecipeChanges, RecipeDraft, RecipeUpdate,
    },
    session::SessionData,
    store::{CatalogStore, RecipeStore},
};

/// Creates a recipe authored by the session user.
///
/// Every reference is resolved against the catalog before anything is
/// written, and the recipe row, tag links and snapshots are stored as one
/// unit.
pub async fn create<S>(
    store: &S,
    session: &SessionData,
    payload: &NewRecipe,
) -> Result<ComposedRecipe, Error>
where
    S: RecipeStore + ?Sized,
{
    check_text("name", &payload.name)?;
    check_text("image", &payload.image)?;
    check_text("text", &payload.text)?;
    check_cooking_time(payload.cooking_time)?;

    let draft = RecipeDraft {
        name: payload.name.to_owned(),
        image: payload.image.to_owned(),
        text: payload.text.to_owned(),
        cooking_time: payload.cooking_time,
        tag_ids: resolve_tags(store, &payload.tags).await?,
        ingredients: capture_ingredients(store, &payload.ingredients).await?,
    };

    let recipe_id = store.insert_recipe(session.user_id, &draft).await?;
    log::info!(
        "User {} created recipe {recipe_id} with {} ingredients",
        session.user_id,
        draft.ingredients.len()
    );

    load(store, recipe_id).await
}

/// Applies `changes` to a recipe the caller has already been authorized for.
///
/// A list given in `changes` replaces the stored one completely, an absent
/// list is left as it is.
pub async fn update<S>(
    store: &S,
    recipe: &Recipe,
    changes: &RecipeChanges,
) -> Result<ComposedRecipe, Error>
where
    S: RecipeStore + ?Sized,
{
    for (field, value) in [
        ("name", &changes.name),
        ("image", &changes.image),
        ("text", &changes.text),
    ] {
        if let Some(value) = value {
            check_text(field, value)?;
        }
    }
    if let Some(cooking_time) = changes.cooking_time {
        check_cooking_time(cooking_time)?;
    }

    let tag_ids = match &changes.tags {
        Some(tags) => Some(resolve_tags(store, tags).await?),
        None => None,
    };
    let ingredients = match &changes.ingredients {
        Some(ingredients) => Some(capture_ingredients(store, ingredients).await?),
        None => None,
    };

    let update = RecipeUpdate {
        name: changes.name.to_owned(),
        image: changes.image.to_owned(),
        text: changes.text.to_owned(),
        cooking_time: changes.cooking_time,
        tag_ids,
        ingredients,
    };

    store.update_recipe(recipe.id, &update).await?;
    log::info!("Updated recipe {}", recipe.id);

    load(store, recipe.id).await
}

/// Removes the recipe along with its snapshots, tag links, favorites and cart entries
pub async fn destroy<S>(store: &S, recipe: &Recipe) -> Result<(), Error>
where
    S: RecipeStore + ?Sized,
{
    if !store.delete_recipe(recipe.id).await? {
        return Err(Error::not_found("No recipe exists with specified id"));
    }
    log::info!("Deleted recipe {}", recipe.id);

    Ok(())
}

pub async fn load<S>(store: &S, recipe_id: Id) -> Result<ComposedRecipe, Error>
where
    S: RecipeStore + ?Sized,
{
    let recipe = store
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(|| Error::not_found("No recipe exists with specified id"))?;
    let ingredients = store.list_recipe_ingredients(recipe_id).await?;
    let tags = store.list_recipe_tags(recipe_id).await?;

    Ok(ComposedRecipe {
        recipe,
        ingredients,
        tags,
    })
}

/// Fetches a recipe for modification by `session`
pub async fn get_recipe_mut<S>(
    store: &S,
    recipe_id: Id,
    session: &SessionData,
) -> Result<Recipe, Error>
where
    S: RecipeStore + ?Sized,
{
    let recipe = store
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(|| Error::not_found("No recipe exists with specified id"))?;

    session.authorize_author(&recipe)?;

    Ok(recipe)
}

/// Checks every tag id against the catalog. Repeated ids are kept once.
pub async fn resolve_tags<S>(store: &S, tag_ids: &[Id]) -> Result<Vec<Id>, Error>
where
    S: CatalogStore + ?Sized,
{
    let mut resolved: Vec<Id> = Vec::with_capacity(tag_ids.len());
    for &tag_id in tag_ids {
        if resolved.contains(&tag_id) {
            continue;
        }
        if store.get_tag(tag_id).await?.is_none() {
            return Err(Error::validation(format!("Tag {tag_id} does not exist")));
        }
        resolved.push(tag_id);
    }

    Ok(resolved)
}

/// Copies the current catalog name and unit of each ingredient into a snapshot
pub async fn capture_ingredients<S>(
    store: &S,
    amounts: &[IngredientAmount],
) -> Result<Vec<IngredientSnapshot>, Error>
where
    S: CatalogStore + ?Sized,
{
    let mut snapshots = Vec::with_capacity(amounts.len());
    for item in amounts {
        check_amount(item.amount)?;
        let ingredient = store
            .get_ingredient(item.id)
            .await?
            .ok_or_else(|| Error::validation(format!("Ingredient {} does not exist", item.id)))?;

        snapshots.push(IngredientSnapshot::capture(&ingredient, item.amount));
    }

    Ok(snapshots)
}

fn check_text(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("Field {field} may not be blank")));
    }
    Ok(())
}

fn check_cooking_time(cooking_time: i32) -> Result<(), Error> {
    if cooking_time < 1 {
        return Err(Error::validation("Cooking time must be at least 1 minute"));
    }
    Ok(())
}

fn check_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(format!(
            "Ingredient amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}
