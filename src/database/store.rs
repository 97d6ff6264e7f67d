use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    actions::{ingredients, recipes, relations, tags, users},
    error::Error,
    filter::RecipeFilter,
    pagination::{Page, PageContext},
    schema::{
        Id, Ingredient, IngredientSnapshot, Recipe, RecipeDraft, RecipeShort, RecipeUpdate,
        Relation, Tag, User,
    },
};

/// Read-only access to the ingredient and tag reference data
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, Error>;

    /// Ingredients ordered by id, optionally only those whose name starts with `name_prefix`
    async fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, Error>;

    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, Error>;

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, Error>;

    async fn list_tags(&self) -> Result<Vec<Tag>, Error>;
}

#[async_trait]
pub trait RecipeStore: CatalogStore {
    /// Writes the recipe row, its tag links and its snapshots as one unit
    async fn insert_recipe(&self, author_id: Id, draft: &RecipeDraft) -> Result<Id, Error>;

    /// Applies `update` as one unit. A list present in the update replaces
    /// the stored list entirely.
    async fn update_recipe(&self, recipe_id: Id, update: &RecipeUpdate) -> Result<(), Error>;

    /// Deletes the recipe with its snapshots and associations.
    /// Returns `false` if there was no such recipe.
    async fn delete_recipe(&self, recipe_id: Id) -> Result<bool, Error>;

    async fn get_recipe(&self, recipe_id: Id) -> Result<Option<Recipe>, Error>;

    /// Snapshots in the order they were attached
    async fn list_recipe_ingredients(&self, recipe_id: Id)
        -> Result<Vec<IngredientSnapshot>, Error>;

    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, Error>;

    /// Recipes matching `filter`, newest first
    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        page: Page,
    ) -> Result<PageContext<Recipe>, Error>;

    /// Recipes written by `author_id`, newest first
    async fn list_author_recipes(&self, author_id: Id) -> Result<Vec<RecipeShort>, Error>;

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, Error>;

    /// Snapshot lists of the recipes in the user's cart, newest recipe first
    async fn list_cart_ingredients(&self, user_id: Id)
        -> Result<Vec<Vec<IngredientSnapshot>>, Error>;

    async fn has_relation(&self, relation: Relation, user_id: Id, recipe_id: Id)
        -> Result<bool, Error>;

    /// Returns `false` if the pair was already present
    async fn add_relation(&self, relation: Relation, user_id: Id, recipe_id: Id)
        -> Result<bool, Error>;

    /// Returns `false` if there was nothing to remove
    async fn remove_relation(&self, relation: Relation, user_id: Id, recipe_id: Id)
        -> Result<bool, Error>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: Id) -> Result<Option<User>, Error>;

    async fn list_users(&self, page: Page) -> Result<PageContext<User>, Error>;

    async fn is_subscribed(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error>;

    /// Returns `false` if the subscription already existed
    async fn add_subscription(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error>;

    /// Returns `false` if there was nothing to remove
    async fn remove_subscription(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error>;

    /// Users followed by `subscriber_id`, ordered by id
    async fn list_subscriptions(&self, subscriber_id: Id) -> Result<Vec<User>, Error>;
}

pub trait Store: RecipeStore + UserStore {}

impl<T: RecipeStore + UserStore> Store for T {}

/// Postgres backed store
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, Error> {
        ingredients::get_ingredient(id, &self.pool).await
    }

    async fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, Error> {
        ingredients::list_ingredients(name_prefix, &self.pool).await
    }

    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, Error> {
        tags::get_tag(id, &self.pool).await
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, Error> {
        tags::find_tag_by_slug(slug, &self.pool).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        tags::list_tags(&self.pool).await
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn insert_recipe(&self, author_id: Id, draft: &RecipeDraft) -> Result<Id, Error> {
        recipes::insert_recipe(author_id, draft, &self.pool).await
    }

    async fn update_recipe(&self, recipe_id: Id, update: &RecipeUpdate) -> Result<(), Error> {
        recipes::update_recipe(recipe_id, update, &self.pool).await
    }

    async fn delete_recipe(&self, recipe_id: Id) -> Result<bool, Error> {
        recipes::delete_recipe(recipe_id, &self.pool).await
    }

    async fn get_recipe(&self, recipe_id: Id) -> Result<Option<Recipe>, Error> {
        recipes::get_recipe(recipe_id, &self.pool).await
    }

    async fn list_recipe_ingredients(
        &self,
        recipe_id: Id,
    ) -> Result<Vec<IngredientSnapshot>, Error> {
        recipes::list_recipe_ingredients(recipe_id, &self.pool).await
    }

    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, Error> {
        tags::list_recipe_tags(recipe_id, &self.pool).await
    }

    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        page: Page,
    ) -> Result<PageContext<Recipe>, Error> {
        recipes::fetch_recipes(filter, page, &self.pool).await
    }

    async fn list_author_recipes(&self, author_id: Id) -> Result<Vec<RecipeShort>, Error> {
        recipes::list_author_recipes(author_id, &self.pool).await
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, Error> {
        recipes::count_author_recipes(author_id, &self.pool).await
    }

    async fn list_cart_ingredients(
        &self,
        user_id: Id,
    ) -> Result<Vec<Vec<IngredientSnapshot>>, Error> {
        recipes::list_cart_ingredients(user_id, &self.pool).await
    }

    async fn has_relation(
        &self,
        relation: Relation,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        relations::has_relation(relation, user_id, recipe_id, &self.pool).await
    }

    async fn add_relation(
        &self,
        relation: Relation,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        relations::add_relation(relation, user_id, recipe_id, &self.pool).await
    }

    async fn remove_relation(
        &self,
        relation: Relation,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        relations::remove_relation(relation, user_id, recipe_id, &self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, user_id: Id) -> Result<Option<User>, Error> {
        users::get_user_by_id(user_id, &self.pool).await
    }

    async fn list_users(&self, page: Page) -> Result<PageContext<User>, Error> {
        users::fetch_users(page, &self.pool).await
    }

    async fn is_subscribed(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error> {
        users::is_subscribed(subscriber_id, author_id, &self.pool).await
    }

    async fn add_subscription(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error> {
        users::add_subscription(subscriber_id, author_id, &self.pool).await
    }

    async fn remove_subscription(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error> {
        users::remove_subscription(subscriber_id, author_id, &self.pool).await
    }

    async fn list_subscriptions(&self, subscriber_id: Id) -> Result<Vec<User>, Error> {
        users::list_subscriptions(subscriber_id, &self.pool).await
    }
}
