// routes/home.rs
// GET / -> sign-in page; once signed in it lists the day's shortcuts.

use std::sync::Arc;

use askama::Template;
use axum::{extract::State, response::Html};

use super::{render, today};
use crate::error::AppResult;
use crate::settlement::fortnight_containing;
use crate::state::{AppState, commission_setting};

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    salon: String,
    today: String,
    period_start: String,
    period_end: String,
}

pub async fn home(State(st): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let day = today();
    let (start, end) = fortnight_containing(day, &commission_setting(&st));
    render(HomeTemplate {
        salon: st.config.salon_name.clone(),
        today: day.to_string(),
        period_start: start.to_string(),
        period_end: end.to_string(),
    })
}
