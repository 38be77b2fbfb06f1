use crate::{
    data::{DataType, ensure_fits},
    error::{MakeQuerySnafu, SatchelResult},
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use sqlx::{FromRow, PgConnection, Pool, Postgres};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Student {
    pub student_id: i32,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    #[serde(with = "iso_date::option")]
    pub birthdate: Option<Date>,
    pub email: Option<String>,
    #[serde(with = "iso_date::option")]
    pub enrolled_date: Option<Date>,
}

///every field may be left out, and goes in as `NULL`
#[derive(Debug, Default, Deserialize)]
pub struct NewStudentForm {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub birthdate: Option<Date>,
    pub email: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub enrolled_date: Option<Date>,
}

impl NewStudentForm {
    ///the `varchar` limits of the `students` table, checked before the insert
    pub fn ensure_fits_columns(&self) -> SatchelResult<()> {
        ensure_fits(self.firstname.as_deref(), "firstname", 50)?;
        ensure_fits(self.lastname.as_deref(), "lastname", 50)?;
        ensure_fits(self.email.as_deref(), "email", 100)
    }
}

impl DataType for Student {
    type Id = i32;
    type FormForAdding = NewStudentForm;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> SatchelResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT student_id, firstname, lastname, birthdate, email, enrolled_date FROM students WHERE student_id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn get_all(pool: &Pool<Postgres>) -> SatchelResult<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT student_id, firstname, lastname, birthdate, email, enrolled_date FROM students ORDER BY student_id")
            .fetch(pool)
            .try_collect()
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> SatchelResult<Self::Id> {
        let NewStudentForm {
            firstname,
            lastname,
            birthdate,
            email,
            enrolled_date,
        } = to_be_added;

        sqlx::query_scalar::<_, i32>("INSERT INTO students (firstname, lastname, birthdate, email, enrolled_date) VALUES ($1, $2, $3, $4, $5) RETURNING student_id")
            .bind(firstname)
            .bind(lastname)
            .bind(birthdate)
            .bind(email)
            .bind(enrolled_date)
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }
}
