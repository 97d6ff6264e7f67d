mod common;

use common::{kitchen, payload, Kitchen};
use foodgram_sdk::{
    catalog, composer, filter::RecipeFilter, pagination::Page, query::RecipeQuery, relations,
    schema::Id,
    store::CatalogStore,
};

async fn create(k: &Kitchen, name: &str, tags: &[Id]) -> Id {
    composer::create(&k.store, &k.cook, &payload(name, &[(k.salt, 1.0)], tags))
        .await
        .unwrap()
        .recipe
        .id
}

async fn listed(k: &Kitchen, filter: &RecipeFilter) -> Vec<String> {
    catalog::list_recipes(&k.store, Some(&k.cook), filter, Page::new(0, 50))
        .await
        .unwrap()
        .rows
        .into_iter()
        .map(|recipe| recipe.name)
        .collect()
}

#[tokio::test]
async fn tag_union_lists_each_recipe_once() {
    let k = kitchen().await;
    create(&k, "Omelette", &[k.breakfast]).await;
    create(&k, "Salad", &[k.lunch]).await;
    create(&k, "Brunch", &[k.breakfast, k.lunch]).await;
    create(&k, "Plain", &[]).await;

    let filter = RecipeFilter::builder().tags(["breakfast", "lunch"]).build();
    assert_eq!(listed(&k, &filter).await, ["Brunch", "Salad", "Omelette"]);

    let everything = RecipeFilter::builder().build();
    assert_eq!(listed(&k, &everything).await.len(), 4);
}

#[tokio::test]
async fn unknown_slug_adds_nothing() {
    let k = kitchen().await;
    create(&k, "Omelette", &[k.breakfast]).await;

    let filter = RecipeFilter::builder().tags(["dinner"]).build();
    assert!(listed(&k, &filter).await.is_empty());

    let filter = RecipeFilter::builder().tags(["dinner", "breakfast"]).build();
    assert_eq!(listed(&k, &filter).await, ["Omelette"]);
}

#[tokio::test]
async fn blank_tag_parameter_matches_nothing() {
    let k = kitchen().await;
    create(&k, "Omelette", &[k.breakfast]).await;

    let query = RecipeQuery::parse("tags=").unwrap();
    assert!(listed(&k, &query.filter(Some(&k.cook))).await.is_empty());

    let query = RecipeQuery::parse("tags=&tags=breakfast").unwrap();
    assert_eq!(listed(&k, &query.filter(Some(&k.cook))).await, ["Omelette"]);
}

#[tokio::test]
async fn membership_filters_intersect_before_tags() {
    let k = kitchen().await;
    let omelette = create(&k, "Omelette", &[k.breakfast]).await;
    let salad = create(&k, "Salad", &[k.lunch]).await;
    create(&k, "Pie", &[k.lunch]).await;

    relations::add_favorite(&k.store, &k.cook, omelette).await.unwrap();
    relations::add_favorite(&k.store, &k.cook, salad).await.unwrap();
    relations::add_to_shopping_cart(&k.store, &k.cook, salad)
        .await
        .unwrap();

    let query = RecipeQuery::parse("is_favorited=1&tags=lunch&tags=breakfast").unwrap();
    assert_eq!(
        listed(&k, &query.filter(Some(&k.cook))).await,
        ["Salad", "Omelette"]
    );

    let query = RecipeQuery::parse("is_favorited=1&is_in_shopping_cart=1").unwrap();
    assert_eq!(listed(&k, &query.filter(Some(&k.cook))).await, ["Salad"]);

    // favorites belong to the filter's viewer
    let query = RecipeQuery::parse("is_favorited=1").unwrap();
    assert!(listed(&k, &query.filter(Some(&k.guest))).await.is_empty());
    assert!(listed(&k, &query.filter(None)).await.is_empty());
}

#[tokio::test]
async fn listing_is_newest_first_and_paged() {
    let k = kitchen().await;
    for name in ["One", "Two", "Three"] {
        create(&k, name, &[]).await;
    }

    let filter = RecipeFilter::builder().build();
    let page = catalog::list_recipes(&k.store, None, &filter, Page::new(0, 2))
        .await
        .unwrap();

    let names: Vec<&str> = page.rows.iter().map(|recipe| recipe.name.as_str()).collect();
    assert_eq!(names, ["Three", "Two"]);
    assert_eq!(page.total_rows, 3);
    assert_eq!(page.next_offset, Some(2));
    assert!(!page.rows[0].is_favorited);
}

#[tokio::test]
async fn detail_reports_viewer_flags() {
    let k = kitchen().await;
    let recipe = create(&k, "Waffles", &[k.breakfast]).await;
    relations::add_favorite(&k.store, &k.guest, recipe).await.unwrap();

    let detail = catalog::recipe_detail(&k.store, recipe, Some(&k.guest))
        .await
        .unwrap();
    assert!(detail.is_favorited);
    assert!(!detail.is_in_shopping_cart);
    assert_eq!(detail.author.user.username, "cook");
    assert!(!detail.author.is_subscribed);

    let anonymous = catalog::recipe_detail(&k.store, recipe, None).await.unwrap();
    assert!(!anonymous.is_favorited);

    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["ingredients"][0]["id"], k.salt);
    assert_eq!(json["ingredients"][0]["name"], "Salt");
    assert_eq!(json["author"]["username"], "cook");
}

#[tokio::test]
async fn catalog_lookups() {
    let k = kitchen().await;

    let names: Vec<String> = catalog::list_ingredients(&k.store, Some("Fl"))
        .await
        .unwrap()
        .into_iter()
        .map(|ingredient| ingredient.name)
        .collect();
    assert_eq!(names, ["Flour"]);
    assert_eq!(catalog::list_ingredients(&k.store, Some("")).await.unwrap().len(), 3);

    assert_eq!(catalog::list_tags(&k.store).await.unwrap().len(), 2);
    assert_eq!(catalog::get_tag(&k.store, k.lunch).await.unwrap().slug, "lunch");
    assert!(catalog::get_tag(&k.store, 77).await.is_err());
    assert_eq!(
        k.store
            .find_tag_by_slug("breakfast")
            .await
            .unwrap()
            .map(|tag| tag.id),
        Some(k.breakfast)
    );
    assert!(k.store.find_tag_by_slug("dinner").await.unwrap().is_none());
    assert_eq!(
        catalog::get_ingredient(&k.store, k.milk).await.unwrap().measurement_unit,
        "ml"
    );
}
