#![allow(dead_code)]

use foodgram_sdk::{
    memory::MemoryStore,
    schema::{Id, IngredientAmount, NewRecipe},
    session::SessionData,
};

pub struct Kitchen {
    pub store: MemoryStore,
    pub cook: SessionData,
    pub guest: SessionData,
    pub salt: Id,
    pub flour: Id,
    pub milk: Id,
    pub breakfast: Id,
    pub lunch: Id,
}

pub async fn user(store: &MemoryStore, username: &str) -> SessionData {
    let id = store
        .add_user(&format!("{username}@example.com"), username, username, "Tester")
        .await
        .unwrap();
    SessionData::new(id, username)
}

pub async fn kitchen() -> Kitchen {
    let store = MemoryStore::new();
    let cook = user(&store, "cook").await;
    let guest = user(&store, "guest").await;

    let salt = store.add_ingredient("Salt", "g").await;
    let flour = store.add_ingredient("Flour", "g").await;
    let milk = store.add_ingredient("Milk", "ml").await;

    let breakfast = store.add_tag("Breakfast", "#E26C2D", "breakfast").await.unwrap();
    let lunch = store.add_tag("Lunch", "#49B64E", "lunch").await.unwrap();

    Kitchen {
        store,
        cook,
        guest,
        salt,
        flour,
        milk,
        breakfast,
        lunch,
    }
}

pub fn payload(name: &str, ingredients: &[(Id, f64)], tags: &[Id]) -> NewRecipe {
    NewRecipe {
        name: name.to_string(),
        image: format!("{}.png", name.to_lowercase()),
        text: format!("How to make {name}"),
        cooking_time: 10,
        ingredients: ingredients
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect(),
        tags: tags.to_vec(),
    }
}
