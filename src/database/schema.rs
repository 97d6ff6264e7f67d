use serde::{Deserialize, Serialize};

pub type Id = i32;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl Recipe {
    pub fn is_authored_by(&self, user_id: Id) -> bool {
        self.author_id == user_id
    }
}

/// Ingredient line of a recipe, frozen at the moment it was attached.
///
/// `name` and `measurement_unit` are copies of the catalog values and are
/// never refreshed from the catalog afterwards.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSnapshot {
    #[serde(rename = "id")]
    pub ingredient_id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: f64,
}

impl IngredientSnapshot {
    pub fn capture(ingredient: &Ingredient, amount: f64) -> Self {
        Self {
            ingredient_id: ingredient.id,
            name: ingredient.name.to_owned(),
            measurement_unit: ingredient.measurement_unit.to_owned(),
            amount,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeShort {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<&Recipe> for RecipeShort {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.to_owned(),
            image: recipe.image.to_owned(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A recipe together with everything the composer owns for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<IngredientSnapshot>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub id: Id,
    pub author: UserProfile,
    pub name: String,
    pub image: String,
    pub text: String,
    pub ingredients: Vec<IngredientSnapshot>,
    pub tags: Vec<Tag>,
    pub cooking_time: i32,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeDetail {
    pub fn new(
        composed: ComposedRecipe,
        author: UserProfile,
        is_favorited: bool,
        is_in_shopping_cart: bool,
    ) -> Self {
        let ComposedRecipe {
            recipe,
            ingredients,
            tags,
        } = composed;

        Self {
            id: recipe.id,
            author,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            ingredients,
            tags,
            cooking_time: recipe.cooking_time,
            is_favorited,
            is_in_shopping_cart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSummary {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

// Payloads

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IngredientAmount {
    pub id: Id,
    pub amount: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    #[serde(default)]
    pub tags: Vec<Id>,
}

/// Partial update. `None` leaves a field untouched, `Some(vec![])` clears a list.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<Id>>,
}

// Validated writes handed to the store

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub tag_ids: Vec<Id>,
    pub ingredients: Vec<IngredientSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub tag_ids: Option<Vec<Id>>,
    pub ingredients: Option<Vec<IngredientSnapshot>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Favorite,
    ShoppingCart,
}

impl Relation {
    pub fn table(&self) -> &'static str {
        match self {
            Relation::Favorite => "favorites",
            Relation::ShoppingCart => "shopping_cart",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Relation::Favorite => "favorites",
            Relation::ShoppingCart => "your shopping cart",
        }
    }
}
