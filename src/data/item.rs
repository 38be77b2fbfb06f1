use crate::{
    data::{DataType, MutableDataType, ensure_fits, non_empty, present},
    error::{EmptyItemUpdateSnafu, MakeQuerySnafu, NameRequiredSnafu, SatchelError, SatchelResult},
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};
use sqlx::{FromRow, PgConnection, Pool, Postgres};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Item {
    pub id: i32,
    pub name: Option<String>,
    pub description: Option<String>,
}

///the body of both `POST /items` and `PUT /items/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    ///`None` when the field is left out, `Some(None)` when it is sent as `null`
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

const NAME_MAX_CHARS: usize = 100;

#[derive(Debug)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
}

impl TryFrom<ItemPayload> for NewItem {
    type Error = SatchelError;

    fn try_from(ItemPayload { name, description }: ItemPayload) -> Result<Self, Self::Error> {
        let name = non_empty(name).context(NameRequiredSnafu)?;
        ensure_fits(Some(&name), "name", NAME_MAX_CHARS)?;
        Ok(Self {
            name,
            description: description.flatten(),
        })
    }
}

///fields left as `None` keep whatever is stored; `description: Some(None)` clears it
#[derive(Debug)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl TryFrom<ItemPayload> for ItemUpdate {
    type Error = SatchelError;

    fn try_from(ItemPayload { name, description }: ItemPayload) -> Result<Self, Self::Error> {
        let name = non_empty(name);
        //a lone `"description": null` or `""` is still nothing to update
        ensure!(
            name.is_some() || description.as_ref().is_some_and(|d| d.as_deref().is_some_and(|d| !d.is_empty())),
            EmptyItemUpdateSnafu
        );
        ensure_fits(name.as_deref(), "name", NAME_MAX_CHARS)?;
        Ok(Self { name, description })
    }
}

impl DataType for Item {
    type Id = i32;
    type FormForAdding = NewItem;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> SatchelResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, description FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn get_all(pool: &Pool<Postgres>) -> SatchelResult<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, description FROM items ORDER BY id")
            .fetch(pool)
            .try_collect()
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> SatchelResult<Self::Id> {
        let NewItem { name, description } = to_be_added;

        sqlx::query_scalar::<_, i32>(
            "INSERT INTO items (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }
}

impl MutableDataType for Item {
    type FormForUpdating = ItemUpdate;

    //one statement, so nothing can delete the row between checking and writing
    async fn update_in_database(
        id: Self::Id,
        update: Self::FormForUpdating,
        conn: &mut PgConnection,
    ) -> SatchelResult<Option<Self>> {
        let ItemUpdate { name, description } = update;
        let description_supplied = description.is_some();

        sqlx::query_as::<_, Self>(
            "UPDATE items SET name = COALESCE($2, name), description = CASE WHEN $4 THEN $3 ELSE description END WHERE id = $1 RETURNING id, name, description",
        )
        .bind(id)
        .bind(name)
        .bind(description.flatten())
        .bind(description_supplied)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn remove_from_database(id: Self::Id, conn: &mut PgConnection) -> SatchelResult<bool> {
        Ok(sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected()
            > 0)
    }
}
