use crate::{
    data::{
        DataType,
        student::{NewStudentForm, Student},
    },
    error::{MissingStudentSnafu, SatchelResult},
    extract::{IdPath, JsonBody},
    state::SatchelState,
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use snafu::OptionExt;

pub async fn post_student(
    State(state): State<SatchelState>,
    JsonBody(form): JsonBody<NewStudentForm>,
) -> SatchelResult<(StatusCode, Json<Value>)> {
    form.ensure_fits_columns()?;

    let student_id = Student::insert_into_database(form, &mut *state.get_connection().await?).await?;
    info!(student_id, "Added student");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "student added successfully",
            "student_id": student_id,
        })),
    ))
}

pub async fn get_students(State(state): State<SatchelState>) -> SatchelResult<Json<Vec<Student>>> {
    Ok(Json(Student::get_all(&state).await?))
}

pub async fn get_student(
    State(state): State<SatchelState>,
    IdPath(id): IdPath<i32>,
) -> SatchelResult<Json<Student>> {
    let student = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;
    Ok(Json(student))
}
