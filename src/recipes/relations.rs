use crate::{
    catalog,
    error::Error,
    schema::{Id, RecipeDetail, Relation},
    session::SessionData,
    store::{RecipeStore, Store},
};

async fn ensure_recipe<S>(store: &S, recipe_id: Id) -> Result<(), Error>
where
    S: RecipeStore + ?Sized,
{
    match store.get_recipe(recipe_id).await? {
        Some(_) => Ok(()),
        None => Err(Error::not_found("No recipe exists with specified id")),
    }
}

/// Adds the recipe to the session user's favorites or cart.
///
/// Adding a pair that is already present is a conflict, also when a
/// concurrent call got there first.
pub async fn add<S>(
    store: &S,
    session: &SessionData,
    relation: Relation,
    recipe_id: Id,
) -> Result<RecipeDetail, Error>
where
    S: Store + ?Sized,
{
    ensure_recipe(store, recipe_id).await?;

    let already_present = || {
        Error::conflict(format!(
            "This recipe is already in {}",
            relation.describe()
        ))
    };

    if store
        .has_relation(relation, session.user_id, recipe_id)
        .await?
    {
        return Err(already_present());
    }
    if !store
        .add_relation(relation, session.user_id, recipe_id)
        .await?
    {
        log::warn!(
            "Recipe {recipe_id} was added to {} of user {} concurrently",
            relation.table(),
            session.user_id
        );
        return Err(already_present());
    }

    log::info!(
        "User {} added recipe {recipe_id} to {}",
        session.user_id,
        relation.table()
    );

    catalog::recipe_detail(store, recipe_id, Some(session)).await
}

pub async fn remove<S>(
    store: &S,
    session: &SessionData,
    relation: Relation,
    recipe_id: Id,
) -> Result<(), Error>
where
    S: RecipeStore + ?Sized,
{
    ensure_recipe(store, recipe_id).await?;

    if !store
        .remove_relation(relation, session.user_id, recipe_id)
        .await?
    {
        return Err(Error::conflict(format!(
            "This recipe is not in {}",
            relation.describe()
        )));
    }

    log::info!(
        "User {} removed recipe {recipe_id} from {}",
        session.user_id,
        relation.table()
    );

    Ok(())
}

pub async fn add_favorite<S>(
    store: &S,
    session: &SessionData,
    recipe_id: Id,
) -> Result<RecipeDetail, Error>
where
    S: Store + ?Sized,
{
    add(store, session, Relation::Favorite, recipe_id).await
}

pub async fn remove_favorite<S>(
    store: &S,
    session: &SessionData,
    recipe_id: Id,
) -> Result<(), Error>
where
    S: RecipeStore + ?Sized,
{
    remove(store, session, Relation::Favorite, recipe_id).await
}

pub async fn add_to_shopping_cart<S>(
    store: &S,
    session: &SessionData,
    recipe_id: Id,
) -> Result<RecipeDetail, Error>
where
    S: Store + ?Sized,
{
    add(store, session, Relation::ShoppingCart, recipe_id).await
}

pub async fn remove_from_shopping_cart<S>(
    store: &S,
    session: &SessionData,
    recipe_id: Id,
) -> Result<(), Error>
where
    S: RecipeStore + ?Sized,
{
    remove(store, session, Relation::ShoppingCart, recipe_id).await
}
