use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::Error,
    filter::{RecipeFilter, RecipeMemberships},
    pagination::{Page, PageContext},
    schema::{
        Id, Ingredient, IngredientSnapshot, Recipe, RecipeDraft, RecipeShort, RecipeUpdate,
        Relation, Tag, User,
    },
    store::{CatalogStore, RecipeStore, UserStore},
};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<Id, User>,
    ingredients: BTreeMap<Id, Ingredient>,
    tags: BTreeMap<Id, Tag>,
    recipes: BTreeMap<Id, Recipe>,
    recipe_tags: HashMap<Id, Vec<Id>>,
    recipe_ingredients: HashMap<Id, Vec<IngredientSnapshot>>,
    favorites: BTreeSet<(Id, Id)>,
    shopping_cart: BTreeSet<(Id, Id)>,
    // (subscriber, author)
    subscriptions: BTreeSet<(Id, Id)>,
    last_user_id: Id,
    last_ingredient_id: Id,
    last_tag_id: Id,
    last_recipe_id: Id,
}

impl MemoryState {
    fn relation(&self, relation: Relation) -> &BTreeSet<(Id, Id)> {
        match relation {
            Relation::Favorite => &self.favorites,
            Relation::ShoppingCart => &self.shopping_cart,
        }
    }

    fn relation_mut(&mut self, relation: Relation) -> &mut BTreeSet<(Id, Id)> {
        match relation {
            Relation::Favorite => &mut self.favorites,
            Relation::ShoppingCart => &mut self.shopping_cart,
        }
    }

    fn relation_members(&self, relation: Relation, user_id: Option<Id>) -> HashSet<Id> {
        match user_id {
            Some(user_id) => self
                .relation(relation)
                .iter()
                .filter(|(user, _)| *user == user_id)
                .map(|(_, recipe)| *recipe)
                .collect(),
            None => HashSet::new(),
        }
    }

    fn tagged_with(&self, slug: &str) -> HashSet<Id> {
        let tag_id = match self.tags.values().find(|tag| tag.slug == slug) {
            Some(tag) => tag.id,
            None => return HashSet::new(),
        };

        self.recipe_tags
            .iter()
            .filter(|(_, tag_ids)| tag_ids.contains(&tag_id))
            .map(|(recipe_id, _)| *recipe_id)
            .collect()
    }

    /// Same tag foreign key check the Postgres schema enforces. Snapshots
    /// carry their own copy of the ingredient and are not checked.
    fn check_tags(&self, tag_ids: &[Id]) -> Result<(), Error> {
        if let Some(id) = tag_ids.iter().find(|id| !self.tags.contains_key(*id)) {
            return Err(Error::validation(format!("Tag {id} does not exist")));
        }
        Ok(())
    }
}

/// In-process store with the same semantics as the Postgres one.
///
/// Every operation holds the state lock for its whole duration, so multi-row
/// writes are observed all at once or not at all.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(
        &self,
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Id, Error> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|user| user.username == username || user.email == email)
        {
            return Err(Error::conflict("User with this username or email already exists"));
        }

        state.last_user_id += 1;
        let id = state.last_user_id;
        state.users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                username: username.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );

        Ok(id)
    }

    pub async fn add_ingredient(&self, name: &str, measurement_unit: &str) -> Id {
        let mut state = self.state.lock().await;
        state.last_ingredient_id += 1;
        let id = state.last_ingredient_id;
        state.ingredients.insert(
            id,
            Ingredient {
                id,
                name: name.to_string(),
                measurement_unit: measurement_unit.to_string(),
            },
        );

        id
    }

    /// Edits the catalog record only, attached snapshots are left as they are
    pub async fn rename_ingredient(
        &self,
        id: Id,
        name: &str,
        measurement_unit: &str,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        let ingredient = state
            .ingredients
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("No ingredient exists with specified id"))?;

        ingredient.name = name.to_string();
        ingredient.measurement_unit = measurement_unit.to_string();

        Ok(())
    }

    pub async fn add_tag(&self, name: &str, color: &str, slug: &str) -> Result<Id, Error> {
        let mut state = self.state.lock().await;
        if state
            .tags
            .values()
            .any(|tag| tag.name == name || tag.slug == slug)
        {
            return Err(Error::conflict("Tag with this name or slug already exists"));
        }

        state.last_tag_id += 1;
        let id = state.last_tag_id;
        state.tags.insert(
            id,
            Tag {
                id,
                name: name.to_string(),
                color: color.to_string(),
                slug: slug.to_string(),
            },
        );

        Ok(id)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, Error> {
        Ok(self.state.lock().await.ingredients.get(&id).cloned())
    }

    async fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .ingredients
            .values()
            .filter(|ingredient| {
                name_prefix.map_or(true, |prefix| ingredient.name.starts_with(prefix))
            })
            .cloned()
            .collect())
    }

    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, Error> {
        Ok(self.state.lock().await.tags.get(&id).cloned())
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, Error> {
        let state = self.state.lock().await;
        Ok(state.tags.values().find(|tag| tag.slug == slug).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        Ok(self.state.lock().await.tags.values().cloned().collect())
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert_recipe(&self, author_id: Id, draft: &RecipeDraft) -> Result<Id, Error> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&author_id) {
            return Err(Error::validation(format!("User {author_id} does not exist")));
        }
        state.check_tags(&draft.tag_ids)?;

        state.last_recipe_id += 1;
        let id = state.last_recipe_id;
        state.recipes.insert(
            id,
            Recipe {
                id,
                author_id,
                name: draft.name.to_owned(),
                image: draft.image.to_owned(),
                text: draft.text.to_owned(),
                cooking_time: draft.cooking_time,
            },
        );
        state.recipe_tags.insert(id, draft.tag_ids.to_owned());
        state
            .recipe_ingredients
            .insert(id, draft.ingredients.to_owned());

        Ok(id)
    }

    async fn update_recipe(&self, recipe_id: Id, update: &RecipeUpdate) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if !state.recipes.contains_key(&recipe_id) {
            return Err(Error::not_found("No recipe exists with specified id"));
        }
        state.check_tags(update.tag_ids.as_deref().unwrap_or_default())?;

        if let Some(recipe) = state.recipes.get_mut(&recipe_id) {
            if let Some(name) = &update.name {
                recipe.name = name.to_owned();
            }
            if let Some(image) = &update.image {
                recipe.image = image.to_owned();
            }
            if let Some(text) = &update.text {
                recipe.text = text.to_owned();
            }
            if let Some(cooking_time) = update.cooking_time {
                recipe.cooking_time = cooking_time;
            }
        }
        if let Some(tag_ids) = &update.tag_ids {
            state.recipe_tags.insert(recipe_id, tag_ids.to_owned());
        }
        if let Some(ingredients) = &update.ingredients {
            state
                .recipe_ingredients
                .insert(recipe_id, ingredients.to_owned());
        }

        Ok(())
    }

    async fn delete_recipe(&self, recipe_id: Id) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        if state.recipes.remove(&recipe_id).is_none() {
            return Ok(false);
        }

        state.recipe_tags.remove(&recipe_id);
        state.recipe_ingredients.remove(&recipe_id);
        state.favorites.retain(|(_, recipe)| *recipe != recipe_id);
        state.shopping_cart.retain(|(_, recipe)| *recipe != recipe_id);

        Ok(true)
    }

    async fn get_recipe(&self, recipe_id: Id) -> Result<Option<Recipe>, Error> {
        Ok(self.state.lock().await.recipes.get(&recipe_id).cloned())
    }

    async fn list_recipe_ingredients(
        &self,
        recipe_id: Id,
    ) -> Result<Vec<IngredientSnapshot>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .recipe_ingredients
            .get(&recipe_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, Error> {
        let state = self.state.lock().await;
        let mut tags: Vec<Tag> = state
            .recipe_tags
            .get(&recipe_id)
            .into_iter()
            .flatten()
            .filter_map(|tag_id| state.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by_key(|tag| tag.id);

        Ok(tags)
    }

    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        page: Page,
    ) -> Result<PageContext<Recipe>, Error> {
        let state = self.state.lock().await;
        let memberships = RecipeMemberships {
            favorited: state.relation_members(Relation::Favorite, filter.viewer()),
            in_cart: state.relation_members(Relation::ShoppingCart, filter.viewer()),
            tagged: filter
                .tag_slugs()
                .iter()
                .map(|slug| (slug.to_owned(), state.tagged_with(slug)))
                .collect(),
        };

        let recipes = filter
            .apply(state.recipes.keys().copied(), &memberships)
            .into_iter()
            .rev()
            .filter_map(|id| state.recipes.get(&id).cloned())
            .collect();

        Ok(PageContext::paginate(recipes, page))
    }

    async fn list_author_recipes(&self, author_id: Id) -> Result<Vec<RecipeShort>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .recipes
            .values()
            .rev()
            .filter(|recipe| recipe.is_authored_by(author_id))
            .map(RecipeShort::from)
            .collect())
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, Error> {
        let state = self.state.lock().await;
        let count = state
            .recipes
            .values()
            .filter(|recipe| recipe.is_authored_by(author_id))
            .count();

        Ok(count as i64)
    }

    async fn list_cart_ingredients(
        &self,
        user_id: Id,
    ) -> Result<Vec<Vec<IngredientSnapshot>>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .shopping_cart
            .iter()
            .rev()
            .filter(|(user, _)| *user == user_id)
            .filter_map(|(_, recipe_id)| state.recipe_ingredients.get(recipe_id))
            .filter(|snapshots| !snapshots.is_empty())
            .cloned()
            .collect())
    }

    async fn has_relation(
        &self,
        relation: Relation,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        let state = self.state.lock().await;
        Ok(state.relation(relation).contains(&(user_id, recipe_id)))
    }

    async fn add_relation(
        &self,
        relation: Relation,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&user_id) || !state.recipes.contains_key(&recipe_id) {
            return Err(Error::validation(format!(
                "Cannot add recipe {recipe_id} of user {user_id} to {}",
                relation.table()
            )));
        }

        Ok(state.relation_mut(relation).insert((user_id, recipe_id)))
    }

    async fn remove_relation(
        &self,
        relation: Relation,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        Ok(state.relation_mut(relation).remove(&(user_id, recipe_id)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, user_id: Id) -> Result<Option<User>, Error> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self, page: Page) -> Result<PageContext<User>, Error> {
        let state = self.state.lock().await;
        let users = state.users.values().cloned().collect();

        Ok(PageContext::paginate(users, page))
    }

    async fn is_subscribed(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error> {
        let state = self.state.lock().await;
        Ok(state.subscriptions.contains(&(subscriber_id, author_id)))
    }

    async fn add_subscription(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        if subscriber_id == author_id {
            return Err(Error::validation("Users cannot subscribe to themselves"));
        }
        if !state.users.contains_key(&subscriber_id) || !state.users.contains_key(&author_id) {
            return Err(Error::validation(format!(
                "Cannot subscribe user {subscriber_id} to user {author_id}"
            )));
        }

        Ok(state.subscriptions.insert((subscriber_id, author_id)))
    }

    async fn remove_subscription(&self, subscriber_id: Id, author_id: Id) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        Ok(state.subscriptions.remove(&(subscriber_id, author_id)))
    }

    async fn list_subscriptions(&self, subscriber_id: Id) -> Result<Vec<User>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .subscriptions
            .iter()
            .filter(|(subscriber, _)| *subscriber == subscriber_id)
            .filter_map(|(_, author)| state.users.get(author).cloned())
            .collect())
    }
}
