use std::convert::Infallible;

use serde::{de::DeserializeOwned, Serialize};
use warp::{
    http::StatusCode,
    reject::Rejection,
    reply::Reply,
    Filter,
};

use crate::{
    constants::MAX_JSON_BODY_BYTES,
    error::Error,
    query::{RecipeQuery, SubscriptionQuery},
};

#[derive(Serialize)]
struct ErrorMessage {
    errors: String,
}

pub fn with_store<S>(store: S) -> impl Filter<Extract = (S,), Error = Infallible> + Clone
where
    S: Clone + Send + Sync + 'static,
{
    warp::any().map(move || store.clone())
}

/// Raw query string, empty when the request has none
pub fn raw_query() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::query::raw().or_else(|_rejection: Rejection| async {
        Ok::<(String,), Rejection>((String::new(),))
    })
}

pub fn recipe_query() -> impl Filter<Extract = (RecipeQuery,), Error = Rejection> + Clone {
    raw_query().and_then(|raw: String| async move {
        RecipeQuery::parse(&raw).map_err(warp::reject::custom)
    })
}

pub fn subscription_query(
) -> impl Filter<Extract = (SubscriptionQuery,), Error = Rejection> + Clone {
    raw_query().and_then(|raw: String| async move {
        SubscriptionQuery::parse(&raw).map_err(warp::reject::custom)
    })
}

pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_JSON_BODY_BYTES).and(warp::body::json())
}

/// Renders rejections as `{"errors": "..."}`. Server side failures are
/// logged and their detail is not sent to the client.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(error) = err.find::<Error>() {
        let status = error.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed: {error}");
            (status, "Internal server error".to_string())
        } else {
            (status, error.to_string())
        }
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(error) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, error.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        log::error!("Unhandled rejection: {err:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorMessage { errors: message }),
        status,
    ))
}
