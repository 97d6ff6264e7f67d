use std::{collections::HashMap, str::FromStr};

use url::form_urlencoded;

use crate::{
    constants::{RECIPE_COUNT_PER_PAGE, USER_COUNT_PER_PAGE},
    error::Error,
    filter::RecipeFilter,
    pagination::Page,
    session::SessionData,
};

/// Decoded query string. Repeated keys keep every value in order.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    inner: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn parse(raw: &str) -> Self {
        let mut inner: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            inner.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        Self { inner }
    }

    /// Last value given for `key`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.inner.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get_number<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: FromStr,
    {
        match self.get_str(key) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_e| Error::validation(format!("Invalid value for {key}: {value}"))),
            None => Ok(None),
        }
    }

    /// `0` / `1` flag, absent means false
    pub fn get_flag(&self, key: &str) -> Result<bool, Error> {
        match self.get_str(key).map(str::trim) {
            None | Some("0") | Some("false") => Ok(false),
            Some("1") | Some("true") => Ok(true),
            Some(value) => Err(Error::validation(format!(
                "Invalid value for {key}: {value}, expected 0 or 1"
            ))),
        }
    }

    /// `page` (1-based) and `limit`
    pub fn get_page(&self, default_limit: i64) -> Result<Page, Error> {
        let page = self.get_number::<i64>("page")?.unwrap_or(1);
        let limit = self.get_number::<i64>("limit")?.unwrap_or(default_limit);
        if page < 1 || limit < 1 {
            return Err(Error::validation("page and limit must be positive integers"));
        }
        Page::numbered(page, limit)
    }
}

/// Query parameters of the recipe listing
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeQuery {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub tags: Vec<String>,
    pub page: Page,
}

impl RecipeQuery {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let params = QueryParams::parse(raw);

        Ok(Self {
            is_favorited: params.get_flag("is_favorited")?,
            is_in_shopping_cart: params.get_flag("is_in_shopping_cart")?,
            // a blank `tags=` is still a slug, it just matches no tag
            tags: params.get_all("tags").to_vec(),
            page: params.get_page(RECIPE_COUNT_PER_PAGE)?,
        })
    }

    pub fn filter(&self, viewer: Option<&SessionData>) -> RecipeFilter {
        RecipeFilter::builder()
            .viewer(viewer.map(|session| session.user_id))
            .favorited_only(self.is_favorited)
            .in_cart_only(self.is_in_shopping_cart)
            .tags(self.tags.iter().cloned())
            .build()
    }
}

/// Query parameters of the subscription listing
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionQuery {
    pub recipes_limit: Option<i64>,
    pub page: Page,
}

impl SubscriptionQuery {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let params = QueryParams::parse(raw);

        let recipes_limit = params.get_number::<i64>("recipes_limit")?;
        if matches!(recipes_limit, Some(limit) if limit < 1) {
            return Err(Error::validation("recipes_limit must be a positive integer"));
        }

        Ok(Self {
            recipes_limit,
            page: params.get_page(USER_COUNT_PER_PAGE)?,
        })
    }
}
