use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::{stream, StreamExt};
use serde_json::Value;
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    ratings::{
        dto::GameModeHistory,
        history::{csv_rows, filter_recent_points, CSV_HEADER},
    },
    state::AppState,
};

pub const TOP_PLAYERS_LIMIT: u32 = 50;
pub const HISTORY_WINDOW_DAYS: i64 = 30;

/// How many rating-history fetches are in flight at once during the CSV
/// export. Lichess tolerates modest parallelism; 50 at once it does not.
const CSV_FETCH_CONCURRENCY: usize = 4;

pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/topClassical/", get(top_classical))
        .route("/:username/ratinghistory/", get(rating_history))
        .route("/players/rating-history-csv", get(rating_history_csv))
}

/// GET /topClassical/ proxies the upstream leaderboard untouched.
#[instrument(skip(state))]
pub async fn top_classical(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let top = state.lichess.fetch_top_classical(TOP_PLAYERS_LIMIT).await?;
    Ok(Json(top))
}

/// GET /{username}/ratinghistory/ returns, per game mode, the points from
/// the last 30 days. Points keep their raw upstream shape, 0-based month
/// included.
#[instrument(skip(state))]
pub async fn rating_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Vec<GameModeHistory>>, ApiError> {
    let history = state.lichess.fetch_rating_history(&username).await?;
    let today = OffsetDateTime::now_utc().date();
    let trimmed = history
        .into_iter()
        .map(|mode| GameModeHistory {
            points: filter_recent_points(&mode.points, today, HISTORY_WINDOW_DAYS),
            name: mode.name,
        })
        .collect();
    Ok(Json(trimmed))
}

/// GET /players/rating-history-csv flattens the last 30 days of every top
/// player's rating history into a CSV attachment. This endpoint has never
/// required a token and existing consumers call it bare.
#[instrument(skip(state))]
pub async fn rating_history_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let top = state.lichess.fetch_top_classical(TOP_PLAYERS_LIMIT).await?;
    let usernames = top_usernames(&top);
    let today = OffsetDateTime::now_utc().date();

    let histories: Vec<(String, Result<Vec<GameModeHistory>, reqwest::Error>)> =
        stream::iter(usernames)
            .map(|username| {
                let lichess = state.lichess.clone();
                async move {
                    let history = lichess.fetch_rating_history(&username).await;
                    (username, history)
                }
            })
            .buffered(CSV_FETCH_CONCURRENCY)
            .collect()
            .await;

    let mut skipped = 0usize;
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for (username, history) in histories {
        match history {
            Ok(history) => {
                for row in csv_rows(&username, &history, today, HISTORY_WINDOW_DAYS) {
                    csv.push_str(&row);
                    csv.push('\n');
                }
            }
            // One unreachable player must not sink the whole export.
            Err(err) => {
                warn!(%username, error = %err, "skipping player in csv export");
                skipped += 1;
            }
        }
    }
    info!(skipped, bytes = csv.len(), "csv export assembled");

    let format = format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = OffsetDateTime::now_utc()
        .format(&format)
        .context("format export timestamp")?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"rating_history-{stamp}.csv\""),
        ),
    ];
    Ok((headers, csv).into_response())
}

fn top_usernames(top: &Value) -> Vec<String> {
    top.get("users")
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .filter_map(|user| user.get("username").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_usernames_from_leaderboard_json() {
        let top = serde_json::json!({
            "users": [
                {"username": "alpha", "perfs": {}},
                {"username": "beta"},
                {"title": "GM"}
            ]
        });
        assert_eq!(top_usernames(&top), vec!["alpha", "beta"]);
    }

    #[test]
    fn unexpected_leaderboard_shape_yields_no_usernames() {
        assert!(top_usernames(&serde_json::json!({"players": []})).is_empty());
        assert!(top_usernames(&serde_json::json!(null)).is_empty());
    }
}
