use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    schema::{Id, Recipe},
};

/// The authenticated caller, as resolved by the embedding server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: Id,
    pub username: String,
}

impl SessionData {
    pub fn new(user_id: Id, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Only the author may change or remove a recipe
    pub fn authorize_author(&self, recipe: &Recipe) -> Result<(), Error> {
        if !recipe.is_authored_by(self.user_id) {
            return Err(Error::unauthorized(
                "You don't have permission to perform this action",
            ));
        }
        Ok(())
    }
}
