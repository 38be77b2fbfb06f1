use crate::error::{SatchelResult, TooLongSnafu};
use serde::{Deserialize, Deserializer};
use snafu::ensure;
use sqlx::{PgConnection, Pool, Postgres};

pub mod item;
pub mod student;

///a table this service can read from and insert into
pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> SatchelResult<Option<Self>>;
    async fn get_all(pool: &Pool<Postgres>) -> SatchelResult<Vec<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> SatchelResult<Self::Id>;
}

///a table this service can also change after insertion
pub trait MutableDataType: DataType {
    type FormForUpdating;

    ///`Ok(None)` when nothing has that id
    async fn update_in_database(
        id: Self::Id,
        update: Self::FormForUpdating,
        conn: &mut PgConnection,
    ) -> SatchelResult<Option<Self>>;
    ///whether there was a row to remove
    async fn remove_from_database(id: Self::Id, conn: &mut PgConnection) -> SatchelResult<bool>;
}

///treats `null`, missing and `""` the same way
pub fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

///`varchar(n)` counts characters, not bytes
pub fn ensure_fits(value: Option<&str>, field: &'static str, max: usize) -> SatchelResult<()> {
    ensure!(
        value.is_none_or(|v| v.chars().count() <= max),
        TooLongSnafu { field, max }
    );
    Ok(())
}

///for `Option<Option<T>>` fields with `#[serde(default)]`: missing is `None`, `null` is `Some(None)`
pub fn present<'de, D: Deserializer<'de>, T: Deserialize<'de>>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error> {
    Option::<T>::deserialize(deserializer).map(Some)
}
