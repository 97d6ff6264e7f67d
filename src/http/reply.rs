use serde::Serialize;
use warp::{
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    reply::Reply,
};

use crate::{
    constants::{SHOPPING_LIST_CONTENT_TYPE, SHOPPING_LIST_DISPOSITION},
    shopping::ShoppingList,
};

/// The rendered list as a `shopping_cart.txt` attachment
pub fn shopping_list(list: &ShoppingList) -> impl Reply {
    let reply = warp::reply::with_header(list.render(), CONTENT_TYPE, SHOPPING_LIST_CONTENT_TYPE);
    warp::reply::with_header(reply, CONTENT_DISPOSITION, SHOPPING_LIST_DISPOSITION)
}

pub fn created<T: Serialize>(value: &T) -> impl Reply {
    warp::reply::with_status(warp::reply::json(value), StatusCode::CREATED)
}

pub fn no_content() -> impl Reply {
    warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::SHOPPING_LIST_FILENAME, schema::IngredientSnapshot, shopping::aggregate};

    #[tokio::test]
    async fn shopping_list_is_a_text_attachment() {
        let list = aggregate([vec![IngredientSnapshot {
            ingredient_id: 1,
            name: "Salt".to_string(),
            measurement_unit: "g".to_string(),
            amount: 2.5,
        }]]);

        let response = shopping_list(&list).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf8"
        );
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            format!("attachment; filename={SHOPPING_LIST_FILENAME}").as_str()
        );

        let body = warp::hyper::body::to_bytes(response.into_body())
            .await
            .unwrap();
        assert_eq!(&body[..], b"Salt (g) - 2.5\n");
    }

    #[tokio::test]
    async fn creation_replies_with_the_body() {
        let response = created(&["lunch"]).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = warp::hyper::body::to_bytes(response.into_body())
            .await
            .unwrap();
        assert_eq!(&body[..], br#"["lunch"]"#);
    }

    #[test]
    fn removal_replies_without_content() {
        assert_eq!(
            no_content().into_response().status(),
            StatusCode::NO_CONTENT
        );
    }
}
