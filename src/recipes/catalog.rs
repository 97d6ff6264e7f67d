use crate::{
    composer,
    error::Error,
    filter::RecipeFilter,
    pagination::{Page, PageContext},
    schema::{Id, Ingredient, RecipeDetail, Relation, Tag, User, UserProfile},
    session::SessionData,
    store::{CatalogStore, Store, UserStore},
};

pub async fn list_ingredients<S>(
    store: &S,
    name_prefix: Option<&str>,
) -> Result<Vec<Ingredient>, Error>
where
    S: CatalogStore + ?Sized,
{
    let prefix = name_prefix.filter(|prefix| !prefix.is_empty());
    store.list_ingredients(prefix).await
}

pub async fn get_ingredient<S>(store: &S, id: Id) -> Result<Ingredient, Error>
where
    S: CatalogStore + ?Sized,
{
    store
        .get_ingredient(id)
        .await?
        .ok_or_else(|| Error::not_found("No ingredient exists with specified id"))
}

pub async fn list_tags<S>(store: &S) -> Result<Vec<Tag>, Error>
where
    S: CatalogStore + ?Sized,
{
    store.list_tags().await
}

pub async fn get_tag<S>(store: &S, id: Id) -> Result<Tag, Error>
where
    S: CatalogStore + ?Sized,
{
    store
        .get_tag(id)
        .await?
        .ok_or_else(|| Error::not_found("No tag exists with specified id"))
}

async fn profile<S>(
    store: &S,
    user: User,
    viewer: Option<&SessionData>,
) -> Result<UserProfile, Error>
where
    S: UserStore + ?Sized,
{
    let is_subscribed = match viewer {
        Some(viewer) if viewer.user_id != user.id => {
            store.is_subscribed(viewer.user_id, user.id).await?
        }
        _ => false,
    };

    Ok(UserProfile { user, is_subscribed })
}

pub async fn user_profile<S>(
    store: &S,
    user_id: Id,
    viewer: Option<&SessionData>,
) -> Result<UserProfile, Error>
where
    S: UserStore + ?Sized,
{
    let user = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| Error::not_found("No user exists with specified id"))?;

    profile(store, user, viewer).await
}

pub async fn list_users<S>(
    store: &S,
    viewer: Option<&SessionData>,
    page: Page,
) -> Result<PageContext<UserProfile>, Error>
where
    S: UserStore + ?Sized,
{
    let users = store.list_users(page).await?;

    let mut rows = Vec::with_capacity(users.rows.len());
    for user in &users.rows {
        rows.push(profile(store, user.clone(), viewer).await?);
    }

    Ok(users.with_rows(rows))
}

/// Full recipe view with author profile and the viewer's favorite and cart flags
pub async fn recipe_detail<S>(
    store: &S,
    recipe_id: Id,
    viewer: Option<&SessionData>,
) -> Result<RecipeDetail, Error>
where
    S: Store + ?Sized,
{
    let composed = composer::load(store, recipe_id).await?;
    let author = user_profile(store, composed.recipe.author_id, viewer).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => (
            store
                .has_relation(Relation::Favorite, viewer.user_id, recipe_id)
                .await?,
            store
                .has_relation(Relation::ShoppingCart, viewer.user_id, recipe_id)
                .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeDetail::new(
        composed,
        author,
        is_favorited,
        is_in_shopping_cart,
    ))
}

/// Recipes matching `filter`, newest first. Favorite and cart clauses refer
/// to the filter's viewer, the detail flags to `viewer`.
pub async fn list_recipes<S>(
    store: &S,
    viewer: Option<&SessionData>,
    filter: &RecipeFilter,
    page: Page,
) -> Result<PageContext<RecipeDetail>, Error>
where
    S: Store + ?Sized,
{
    log::debug!("Listing recipes with {filter:?}");
    let recipes = store.fetch_recipes(filter, page).await?;

    let mut rows = Vec::with_capacity(recipes.rows.len());
    for recipe in &recipes.rows {
        rows.push(recipe_detail(store, recipe.id, viewer).await?);
    }

    Ok(recipes.with_rows(rows))
}
