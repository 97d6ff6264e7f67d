//! Runs against a live database: `DATABASE_URL=... cargo test -- --ignored`

use foodgram_sdk::{
    actions::{ingredients, recipes, tags, users},
    composer,
    error::Error,
    filter::RecipeFilter,
    pagination::Page,
    relations,
    schema::{IngredientAmount, IngredientSnapshot, NewRecipe, RecipeChanges, RecipeDraft},
    session::SessionData,
    shopping,
    store::{PgStore, RecipeStore},
    subscriptions,
};
use sqlx::PgPool;

async fn session(pool: &PgPool, username: &str) -> SessionData {
    let id = users::create_user(&format!("{username}@example.com"), username, "", "", pool)
        .await
        .unwrap()
        .unwrap();
    SessionData::new(id, username)
}

fn payload(name: &str, ingredients: Vec<(i32, f64)>, tags: Vec<i32>) -> NewRecipe {
    NewRecipe {
        name: name.to_string(),
        image: "image.png".to_string(),
        text: "Cook it".to_string(),
        cooking_time: 5,
        ingredients: ingredients
            .into_iter()
            .map(|(id, amount)| IngredientAmount { id, amount })
            .collect(),
        tags,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn snapshots_are_frozen_and_replaced(pool: PgPool) {
    let cook = session(&pool, "cook").await;
    let salt = ingredients::create_ingredient("Salt", "g", &pool).await.unwrap();
    let milk = ingredients::create_ingredient("Milk", "ml", &pool).await.unwrap();
    let store = PgStore::new(pool.clone());

    let recipe = composer::create(&store, &cook, &payload("Soup", vec![(salt, 2.0)], vec![]))
        .await
        .unwrap();
    ingredients::update_ingredient(salt, "Sea salt", "kg", &pool)
        .await
        .unwrap();

    let reloaded = composer::load(&store, recipe.recipe.id).await.unwrap();
    assert_eq!(reloaded.ingredients[0].name, "Salt");
    assert_eq!(reloaded.ingredients[0].measurement_unit, "g");

    let changes = RecipeChanges {
        ingredients: Some(vec![
            IngredientAmount { id: milk, amount: 100.0 },
            IngredientAmount { id: milk, amount: 50.0 },
        ]),
        ..Default::default()
    };
    let updated = composer::update(&store, &recipe.recipe, &changes)
        .await
        .unwrap();
    assert_eq!(updated.ingredients.len(), 2);
    assert!(updated.ingredients.iter().all(|s| s.name == "Milk"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn catalog_ingredient_can_be_deleted_under_a_snapshot(pool: PgPool) {
    let cook = session(&pool, "cook").await;
    let salt = ingredients::create_ingredient("Salt", "g", &pool).await.unwrap();
    let store = PgStore::new(pool);

    let recipe = composer::create(&store, &cook, &payload("Brine", vec![(salt, 3.0)], vec![]))
        .await
        .unwrap();

    sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(salt)
        .execute(store.pool())
        .await
        .unwrap();

    let reloaded = composer::load(&store, recipe.recipe.id).await.unwrap();
    assert_eq!(reloaded.ingredients, recipe.ingredients);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn failed_create_rolls_back(pool: PgPool) {
    let cook = session(&pool, "cook").await;
    let salt = ingredients::create_ingredient("Salt", "g", &pool).await.unwrap();
    let store = PgStore::new(pool);

    let result = composer::create(&store, &cook, &payload("Soup", vec![(salt, 1.0)], vec![42])).await;
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(store.count_author_recipes(cook.user_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn write_failing_midway_leaves_nothing_behind(pool: PgPool) {
    let cook = session(&pool, "cook").await;
    let salt = ingredients::create_ingredient("Salt", "g", &pool).await.unwrap();
    let store = PgStore::new(pool);

    let ingredient = ingredients::get_ingredient(salt, store.pool())
        .await
        .unwrap()
        .unwrap();
    // the recipe row is written before the dangling tag link fails
    let draft = RecipeDraft {
        name: "Soup".to_string(),
        image: "image.png".to_string(),
        text: "Cook it".to_string(),
        cooking_time: 5,
        tag_ids: vec![42],
        ingredients: vec![IngredientSnapshot::capture(&ingredient, 1.0)],
    };
    assert!(recipes::insert_recipe(cook.user_id, &draft, store.pool())
        .await
        .is_err());

    let recipe_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
        .fetch_one(store.pool())
        .await
        .unwrap();
    let snapshot_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_ingredients")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!((recipe_rows, snapshot_rows), (0, 0));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn relations_filters_and_cart(pool: PgPool) {
    let cook = session(&pool, "cook").await;
    let guest = session(&pool, "guest").await;
    let salt = ingredients::create_ingredient("Salt", "g", &pool).await.unwrap();
    let flour = ingredients::create_ingredient("Flour", "g", &pool).await.unwrap();
    let breakfast = tags::create_tag("Breakfast", "#E26C2D", "breakfast", &pool)
        .await
        .unwrap();
    let lunch = tags::create_tag("Lunch", "#49B64E", "lunch", &pool)
        .await
        .unwrap();
    let store = PgStore::new(pool);

    let first = composer::create(&store, &cook, &payload("Brine", vec![(salt, 5.0)], vec![breakfast]))
        .await
        .unwrap();
    let second = composer::create(
        &store,
        &cook,
        &payload("Dough", vec![(salt, 3.0), (flour, 200.0)], vec![breakfast, lunch]),
    )
    .await
    .unwrap();

    let filter = RecipeFilter::builder().tags(["breakfast", "lunch"]).build();
    let listed = store.fetch_recipes(&filter, Page::default()).await.unwrap();
    assert_eq!(listed.total_rows, 2);

    relations::add_to_shopping_cart(&store, &guest, second.recipe.id)
        .await
        .unwrap();
    relations::add_to_shopping_cart(&store, &guest, first.recipe.id)
        .await
        .unwrap();
    assert!(matches!(
        relations::add_to_shopping_cart(&store, &guest, first.recipe.id).await,
        Err(Error::Conflict(_))
    ));

    let cart = RecipeFilter::builder()
        .viewer(Some(guest.user_id))
        .in_cart_only(true)
        .tags(["lunch"])
        .build();
    let listed = store.fetch_recipes(&cart, Page::default()).await.unwrap();
    assert_eq!(listed.rows.len(), 1);
    assert_eq!(listed.rows[0].id, second.recipe.id);

    // newest recipe first
    let list = shopping::shopping_list_for(&store, &guest).await.unwrap();
    assert_eq!(shopping::render(&list), "Salt (g) - 8.0\nFlour (g) - 200.0\n");

    assert!(matches!(
        subscriptions::subscribe(&store, &guest, guest.user_id).await,
        Err(Error::Conflict(_))
    ));
    let summary = subscriptions::subscribe(&store, &guest, cook.user_id)
        .await
        .unwrap();
    assert_eq!(summary.recipes_count, 2);
}
