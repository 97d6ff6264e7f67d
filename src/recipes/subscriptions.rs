use crate::{
    error::Error,
    pagination::{Page, PageContext},
    schema::{Id, SubscriptionSummary, User, UserProfile},
    session::SessionData,
    store::Store,
};

/// Drops every entry whose recipe count is above `recipes_limit`.
///
/// The limit filters whole users; it does not shorten anyone's recipe list.
pub fn exclude_over_limit<T, F>(
    entries: Vec<T>,
    recipes_limit: Option<i64>,
    recipe_count: F,
) -> Vec<T>
where
    F: Fn(&T) -> i64,
{
    match recipes_limit {
        Some(limit) => entries
            .into_iter()
            .filter(|entry| recipe_count(entry) <= limit)
            .collect(),
        None => entries,
    }
}

async fn summary_for<S>(
    store: &S,
    author: User,
    recipes_count: i64,
) -> Result<SubscriptionSummary, Error>
where
    S: Store + ?Sized,
{
    let recipes = store.list_author_recipes(author.id).await?;

    Ok(SubscriptionSummary {
        profile: UserProfile {
            user: author,
            is_subscribed: true,
        },
        recipes,
        recipes_count,
    })
}

/// Users the session user follows, each with their recipes and recipe count.
///
/// Exclusion by `recipes_limit` happens before `page` is applied, and the
/// subscription order (by user id) is kept.
pub async fn summarize<S>(
    store: &S,
    session: &SessionData,
    recipes_limit: Option<i64>,
    page: Page,
) -> Result<PageContext<SubscriptionSummary>, Error>
where
    S: Store + ?Sized,
{
    if let Some(limit) = recipes_limit {
        if limit < 1 {
            return Err(Error::validation("recipes_limit must be a positive integer"));
        }
    }

    let authors = store.list_subscriptions(session.user_id).await?;
    let mut counted = Vec::with_capacity(authors.len());
    for author in authors {
        let count = store.count_author_recipes(author.id).await?;
        counted.push((author, count));
    }

    let followed = counted.len();
    let kept = exclude_over_limit(counted, recipes_limit, |(_, count)| *count);
    log::debug!(
        "User {} follows {followed} users, {} within recipes_limit {recipes_limit:?}",
        session.user_id,
        kept.len()
    );

    let page = PageContext::paginate(kept, page);
    let mut rows = Vec::with_capacity(page.rows.len());
    for (author, count) in &page.rows {
        rows.push(summary_for(store, author.clone(), *count).await?);
    }

    Ok(page.with_rows(rows))
}

pub async fn subscribe<S>(
    store: &S,
    session: &SessionData,
    author_id: Id,
) -> Result<SubscriptionSummary, Error>
where
    S: Store + ?Sized,
{
    let author = store
        .get_user(author_id)
        .await?
        .ok_or_else(|| Error::not_found("No user exists with specified id"))?;

    if author.id == session.user_id {
        return Err(Error::conflict("You cannot subscribe to yourself"));
    }
    if store.is_subscribed(session.user_id, author_id).await?
        || !store.add_subscription(session.user_id, author_id).await?
    {
        return Err(Error::conflict("You are already subscribed to this user"));
    }

    log::info!("User {} subscribed to user {author_id}", session.user_id);

    let recipes_count = store.count_author_recipes(author_id).await?;
    summary_for(store, author, recipes_count).await
}

pub async fn unsubscribe<S>(store: &S, session: &SessionData, author_id: Id) -> Result<(), Error>
where
    S: Store + ?Sized,
{
    if store.get_user(author_id).await?.is_none() {
        return Err(Error::not_found("No user exists with specified id"));
    }
    if !store.remove_subscription(session.user_id, author_id).await? {
        return Err(Error::conflict("This user is not in your subscriptions"));
    }

    log::info!("User {} unsubscribed from user {author_id}", session.user_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_excludes_users_above_it() {
        let counts = vec![("a", 3), ("b", 1), ("c", 2)];

        let kept = exclude_over_limit(counts, Some(2), |(_, count)| *count);
        assert_eq!(kept, vec![("b", 1), ("c", 2)]);
    }

    #[test]
    fn no_limit_keeps_everyone_in_order() {
        let counts = vec![("a", 30), ("b", 0)];

        let kept = exclude_over_limit(counts.clone(), None, |(_, count)| *count);
        assert_eq!(kept, counts);
    }
}
