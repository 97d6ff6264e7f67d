use std::collections::{BTreeSet, HashMap, HashSet};

use sqlx::{Postgres, QueryBuilder};

use crate::schema::Id;

/// Recipe listing filter.
///
/// Clauses are combined in a fixed order: favorite and cart restrictions
/// intersect the base set first, then the tag slugs are unioned over the
/// already restricted set:
///
/// `(base ∩ favorited? ∩ in_cart?) ∩ (tag_1 ∪ tag_2 ∪ …)`
///
/// An empty slug list applies no tag restriction. An unknown slug adds
/// nothing to the union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    viewer: Option<Id>,
    favorited_only: bool,
    in_cart_only: bool,
    tag_slugs: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecipeFilterBuilder {
    filter: RecipeFilter,
}

impl RecipeFilterBuilder {
    /// User whose favorites and cart the membership clauses refer to
    pub fn viewer(mut self, user_id: Option<Id>) -> Self {
        self.filter.viewer = user_id;
        self
    }

    pub fn favorited_only(mut self, enabled: bool) -> Self {
        self.filter.favorited_only = enabled;
        self
    }

    pub fn in_cart_only(mut self, enabled: bool) -> Self {
        self.filter.in_cart_only = enabled;
        self
    }

    pub fn tags<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for slug in slugs {
            let slug = slug.into();
            if !self.filter.tag_slugs.contains(&slug) {
                self.filter.tag_slugs.push(slug);
            }
        }
        self
    }

    pub fn build(self) -> RecipeFilter {
        self.filter
    }
}

/// Membership sets a filter is evaluated against, all seen from the filter's viewer
#[derive(Debug, Clone, Default)]
pub struct RecipeMemberships {
    pub favorited: HashSet<Id>,
    pub in_cart: HashSet<Id>,
    pub tagged: HashMap<String, HashSet<Id>>,
}

impl RecipeFilter {
    pub fn builder() -> RecipeFilterBuilder {
        RecipeFilterBuilder::default()
    }

    pub fn viewer(&self) -> Option<Id> {
        self.viewer
    }

    pub fn favorited_only(&self) -> bool {
        self.favorited_only
    }

    pub fn in_cart_only(&self) -> bool {
        self.in_cart_only
    }

    pub fn tag_slugs(&self) -> &[String] {
        &self.tag_slugs
    }

    pub fn apply<I>(&self, base: I, memberships: &RecipeMemberships) -> BTreeSet<Id>
    where
        I: IntoIterator<Item = Id>,
    {
        let mut restricted: BTreeSet<Id> = base.into_iter().collect();

        if self.favorited_only {
            restricted.retain(|id| memberships.favorited.contains(id));
        }
        if self.in_cart_only {
            restricted.retain(|id| memberships.in_cart.contains(id));
        }
        if self.tag_slugs.is_empty() {
            return restricted;
        }

        self.tag_slugs
            .iter()
            .fold(BTreeSet::new(), |mut union, slug| {
                if let Some(tagged) = memberships.tagged.get(slug) {
                    union.extend(restricted.iter().filter(|id| tagged.contains(*id)));
                }
                union
            })
    }

    /// Appends the `WHERE` clause to a query selecting from `recipes r`.
    ///
    /// The slug union is a single `EXISTS … = ANY(…)` so a recipe carrying
    /// several of the requested tags is still returned once.
    pub fn push_where(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(" WHERE TRUE");

        if self.favorited_only || self.in_cart_only {
            match self.viewer {
                Some(user_id) => {
                    if self.favorited_only {
                        query
                            .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                            .push_bind(user_id)
                            .push(")");
                    }
                    if self.in_cart_only {
                        query
                            .push(" AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
                            .push_bind(user_id)
                            .push(")");
                    }
                }
                // anonymous viewers have neither favorites nor a cart
                None => {
                    query.push(" AND FALSE");
                }
            }
        }

        if !self.tag_slugs.is_empty() {
            query
                .push(" AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = r.id AND t.slug = ANY(")
                .push_bind(self.tag_slugs.clone())
                .push("))");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memberships() -> RecipeMemberships {
        RecipeMemberships {
            favorited: HashSet::from([1, 2, 4]),
            in_cart: HashSet::from([2, 3, 4]),
            tagged: HashMap::from([
                ("breakfast".to_string(), HashSet::from([1, 2])),
                ("lunch".to_string(), HashSet::from([2, 3, 5])),
            ]),
        }
    }

    #[test]
    fn tag_union_returns_each_recipe_once() {
        let filter = RecipeFilter::builder()
            .tags(["breakfast", "lunch"])
            .build();

        let result = filter.apply(1..=5, &memberships());
        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 5]);
    }

    #[test]
    fn no_tags_means_no_tag_restriction() {
        let filter = RecipeFilter::builder().build();
        assert_eq!(filter.apply(1..=5, &memberships()).len(), 5);
    }

    #[test]
    fn intersections_apply_before_the_union() {
        let filter = RecipeFilter::builder()
            .viewer(Some(7))
            .favorited_only(true)
            .in_cart_only(true)
            .tags(["breakfast", "lunch"])
            .build();

        // favorited ∩ cart = {2, 4}; 4 carries neither tag
        let result = filter.apply(1..=5, &memberships());
        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn unknown_slug_contributes_nothing() {
        let filter = RecipeFilter::builder()
            .tags(["dinner", "breakfast"])
            .build();

        let result = filter.apply(1..=5, &memberships());
        assert_eq!(result.into_iter().collect::<Vec<_>>(), vec![1, 2]);

        let only_unknown = RecipeFilter::builder().tags(["dinner"]).build();
        assert!(only_unknown.apply(1..=5, &memberships()).is_empty());
    }

    #[test]
    fn duplicate_slugs_are_collapsed() {
        let filter = RecipeFilter::builder()
            .tags(["lunch", "lunch", "breakfast"])
            .build();
        assert_eq!(filter.tag_slugs(), ["lunch", "breakfast"]);
    }

    #[test]
    fn sql_keeps_intersections_and_union_in_one_where_clause() {
        let filter = RecipeFilter::builder()
            .viewer(Some(3))
            .favorited_only(true)
            .tags(["breakfast", "lunch"])
            .build();

        let mut query = QueryBuilder::<Postgres>::new("SELECT r.id FROM recipes r");
        filter.push_where(&mut query);

        assert_eq!(
            query.sql(),
            "SELECT r.id FROM recipes r WHERE TRUE \
             AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = $1) \
             AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = r.id AND t.slug = ANY($2))"
        );
    }

    #[test]
    fn sql_for_anonymous_membership_filter_matches_nothing() {
        let filter = RecipeFilter::builder().in_cart_only(true).build();

        let mut query = QueryBuilder::<Postgres>::new("SELECT r.id FROM recipes r");
        filter.push_where(&mut query);

        assert_eq!(query.sql(), "SELECT r.id FROM recipes r WHERE TRUE AND FALSE");
    }
}
