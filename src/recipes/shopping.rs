use std::collections::HashMap;

use serde::Serialize;

use crate::{error::Error, schema::IngredientSnapshot, session::SessionData, store::RecipeStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub amount: f64,
}

/// Ingredient totals keyed by name, iterated in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingList {
    entries: Vec<ShoppingListEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ShoppingList {
    /// Adds a snapshot to the list. A repeated name sums the amounts and
    /// takes the unit of the later snapshot; units are never converted.
    pub fn add(&mut self, snapshot: &IngredientSnapshot) {
        if let Some(entry) = self
            .index
            .get(&snapshot.name)
            .and_then(|position| self.entries.get_mut(*position))
        {
            entry.amount += snapshot.amount;
            entry.measurement_unit = snapshot.measurement_unit.to_owned();
            return;
        }

        self.index
            .insert(snapshot.name.to_owned(), self.entries.len());
        self.entries.push(ShoppingListEntry {
            name: snapshot.name.to_owned(),
            measurement_unit: snapshot.measurement_unit.to_owned(),
            amount: snapshot.amount,
        });
    }

    pub fn get(&self, name: &str) -> Option<&ShoppingListEntry> {
        self.index
            .get(name)
            .and_then(|position| self.entries.get(*position))
    }

    pub fn entries(&self) -> &[ShoppingListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `"{name} ({measurement_unit}) - {amount}"` line per entry, newline terminated
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{} ({}) - {}\n",
                    entry.name,
                    entry.measurement_unit,
                    format_amount(entry.amount)
                )
            })
            .collect()
    }
}

/// Whole amounts keep one decimal place, `8.0` stays `8.0`
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.1}")
    } else {
        amount.to_string()
    }
}

/// Merges the snapshots of every recipe, recipe order first, then snapshot order
pub fn aggregate<I, R>(recipes: I) -> ShoppingList
where
    I: IntoIterator<Item = R>,
    R: AsRef<[IngredientSnapshot]>,
{
    let mut list = ShoppingList::default();
    for recipe in recipes {
        for snapshot in recipe.as_ref() {
            list.add(snapshot);
        }
    }
    list
}

pub fn render(list: &ShoppingList) -> String {
    list.render()
}

/// Aggregates the current user's shopping cart
pub async fn shopping_list_for<S>(store: &S, session: &SessionData) -> Result<ShoppingList, Error>
where
    S: RecipeStore + ?Sized,
{
    let recipes = store.list_cart_ingredients(session.user_id).await?;
    let list = aggregate(&recipes);

    log::debug!(
        "Aggregated {} cart recipes into {} lines for user {}",
        recipes.len(),
        list.len(),
        session.user_id
    );

    Ok(list)
}
