//! Store management. Managers see and edit their own stores; admins see all.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use bloomway_core::StoreId;
use bloomway_core::i18n::Labels;
use bloomway_core::models::{Day, DayHours, Store, StoreInput};
use chrono::NaiveTime;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Page, RequireStaff};
use crate::models::{CurrentUser, Flash};
use crate::routes::stores::{StoreView, local_now};
use crate::routes::{labels, recover, redirect_with};
use crate::state::AppState;

const TIME_FORMAT: &str = "%H:%M";

/// Stores `user` may manage.
pub(crate) async fn manageable_stores(
    state: &AppState,
    user: &CurrentUser,
) -> std::result::Result<Vec<Store>, ApiError> {
    if user.is_admin() {
        Ok(state.api().stores().await?.as_ref().clone())
    } else {
        state.api().my_stores(user.token()).await
    }
}

/// Look up a store `user` may manage, or `NotFound`.
async fn find_manageable(state: &AppState, user: &CurrentUser, id: &StoreId) -> Result<Store> {
    manageable_stores(state, user)
        .await?
        .into_iter()
        .find(|s| &s.id == id)
        .ok_or_else(|| AppError::NotFound("store".to_string()))
}

// =============================================================================
// Form model
// =============================================================================

/// One day's inputs, as typed.
#[derive(Debug, Clone)]
pub struct DayFormRow {
    pub key: &'static str,
    pub label: &'static str,
    pub working: bool,
    pub open: String,
    pub close: String,
    pub break_start: String,
    pub break_end: String,
}

/// The store editor's inputs, as typed.
#[derive(Debug, Clone)]
pub struct StoreForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub days: Vec<DayFormRow>,
}

fn format_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

impl StoreForm {
    /// Empty form: weekdays 09:00 to 18:00, weekend closed.
    #[must_use]
    pub fn blank() -> Self {
        let days = Day::ALL
            .into_iter()
            .map(|day| {
                let weekend = matches!(day, Day::Saturday | Day::Sunday);
                DayFormRow {
                    key: day.key(),
                    label: day.short(),
                    working: !weekend,
                    open: "09:00".to_string(),
                    close: "18:00".to_string(),
                    break_start: String::new(),
                    break_end: String::new(),
                }
            })
            .collect();
        Self {
            name: String::new(),
            address: String::new(),
            city: String::new(),
            phone: String::new(),
            days,
        }
    }

    #[must_use]
    pub fn from_store(store: &Store) -> Self {
        let days = store
            .weekly_hours()
            .iter()
            .map(|h| DayFormRow {
                key: h.day.key(),
                label: h.day.short(),
                working: h.is_working && h.open < h.close,
                open: format_time(Some(h.open)),
                close: format_time(Some(h.close)),
                break_start: format_time(h.break_start),
                break_end: format_time(h.break_end),
            })
            .collect();
        Self {
            name: store.name.clone(),
            address: store.address.clone(),
            city: store.city.clone(),
            phone: store.phone.clone(),
            days,
        }
    }

    /// Read the submitted fields. Day fields are named `{day}_open`,
    /// `{day}_close`, `{day}_break_start`, `{day}_break_end` and the
    /// `{day}_working` checkbox.
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let fields: HashMap<&str, &str> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .collect();
        let get = |name: &str| fields.get(name).copied().unwrap_or_default().to_string();

        let days = Day::ALL
            .into_iter()
            .map(|day| {
                let key = day.key();
                DayFormRow {
                    key,
                    label: day.short(),
                    working: fields.contains_key(format!("{key}_working").as_str()),
                    open: get(&format!("{key}_open")),
                    close: get(&format!("{key}_close")),
                    break_start: get(&format!("{key}_break_start")),
                    break_end: get(&format!("{key}_break_end")),
                }
            })
            .collect();

        Self {
            name: get("name"),
            address: get("address"),
            city: get("city"),
            phone: get("phone"),
            days,
        }
    }

    /// Validate into an API body.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn to_input(&self, labels: &Labels) -> std::result::Result<StoreInput, String> {
        let invalid = |field: &str| format!("{field}: {}", labels.invalid_form);
        if self.name.is_empty() {
            return Err(invalid(labels.name));
        }
        if self.city.is_empty() {
            return Err(invalid(labels.city));
        }

        let time = |raw: &str, what: &str, day: &DayFormRow| {
            NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .map_err(|_| invalid(&format!("{} {what}", day.label)))
        };
        let optional_time = |raw: &str, what: &str, day: &DayFormRow| {
            if raw.is_empty() {
                Ok(None)
            } else {
                time(raw, what, day).map(Some)
            }
        };

        let mut hours = Vec::with_capacity(self.days.len());
        for (day, row) in Day::ALL.into_iter().zip(&self.days) {
            if !row.working {
                hours.push(DayHours::closed(day));
                continue;
            }
            let open = time(&row.open, labels.open_at, row)?;
            let close = time(&row.close, labels.close_at, row)?;
            if close <= open {
                return Err(invalid(&format!("{} {}", row.label, labels.close_at)));
            }
            let break_start = optional_time(&row.break_start, labels.break_time, row)?;
            let break_end = optional_time(&row.break_end, labels.break_time, row)?;
            match (break_start, break_end) {
                (None, None) => {}
                (Some(start), Some(end)) if open <= start && start < end && end <= close => {}
                _ => return Err(invalid(&format!("{} {}", row.label, labels.break_time))),
            }
            hours.push(DayHours {
                day,
                is_working: true,
                open,
                close,
                break_start,
                break_end,
            });
        }

        Ok(StoreInput {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            phone: self.phone.clone(),
            hours,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "profile/stores.html")]
pub struct StoresTemplate {
    pub page: Page,
    pub stores: Vec<StoreView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "profile/store_form.html")]
pub struct StoreFormTemplate {
    pub page: Page,
    /// Where the form posts.
    pub action: String,
    pub form: StoreForm,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Stores the user manages.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    page: Page,
) -> Result<StoresTemplate> {
    let now = local_now();
    let stores = manageable_stores(&state, &user)
        .await?
        .iter()
        .map(|s| StoreView::new(s, page.labels, now))
        .collect();
    Ok(StoresTemplate { page, stores })
}

/// Blank store form.
#[instrument(skip_all)]
pub async fn new(RequireStaff(_user): RequireStaff, page: Page) -> StoreFormTemplate {
    StoreFormTemplate {
        page,
        action: "/profile/stores".to_string(),
        form: StoreForm::blank(),
        error: None,
    }
}

/// Create a store.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(user): RequireStaff,
    page: Page,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = StoreForm::from_pairs(&pairs);
    let input = match form.to_input(page.labels) {
        Ok(input) => input,
        Err(error) => {
            return Ok(StoreFormTemplate {
                page,
                action: "/profile/stores".to_string(),
                form,
                error: Some(error),
            }
            .into_response());
        }
    };

    match state.api().create_store(user.token(), &input).await {
        Ok(store) => {
            tracing::info!(store_id = %store.id, "Store created");
            Ok(redirect_with(&session, Flash::success(page.labels.saved), "/profile/stores").await)
        }
        Err(e) => recover(&session, page.labels, e, "/profile/stores/new").await,
    }
}

/// Store form filled with the current values.
#[instrument(skip(state, user, page))]
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    page: Page,
    Path(id): Path<String>,
) -> Result<StoreFormTemplate> {
    let store = find_manageable(&state, &user, &StoreId::new(id)).await?;
    Ok(StoreFormTemplate {
        page,
        action: format!("/profile/stores/{}", store.id),
        form: StoreForm::from_store(&store),
        error: None,
    })
}

/// Save changes to a store.
#[instrument(skip(state, session, user, page, pairs))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(user): RequireStaff,
    page: Page,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let store = find_manageable(&state, &user, &StoreId::new(id)).await?;
    let action = format!("/profile/stores/{}", store.id);
    let form = StoreForm::from_pairs(&pairs);
    let input = match form.to_input(page.labels) {
        Ok(input) => input,
        Err(error) => {
            return Ok(StoreFormTemplate {
                page,
                action,
                form,
                error: Some(error),
            }
            .into_response());
        }
    };

    match state.api().update_store(user.token(), &store.id, &input).await {
        Ok(_) => Ok(redirect_with(&session, Flash::success(page.labels.saved), "/profile/stores").await),
        Err(e) => recover(&session, page.labels, e, &format!("{action}/edit")).await,
    }
}

/// Delete a store.
#[instrument(skip(state, session, user))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(user): RequireStaff,
    Path(id): Path<String>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let store = match find_manageable(&state, &user, &StoreId::new(id)).await {
        Ok(store) => store,
        Err(AppError::NotFound(_)) => return Ok(Redirect::to("/profile/stores").into_response()),
        Err(e) => return Err(e),
    };

    match state.api().delete_store(user.token(), &store.id).await {
        Ok(()) => {
            tracing::info!(store_id = %store.id, "Store deleted");
            Ok(redirect_with(&session, Flash::success(labels.deleted), "/profile/stores").await)
        }
        Err(e) => recover(&session, labels, e, "/profile/stores").await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bloomway_core::i18n::Language;

    use super::*;

    fn pairs(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("name".to_string(), "Pike Place".to_string()),
            ("city".to_string(), "Seattle".to_string()),
            ("monday_working".to_string(), "on".to_string()),
            ("monday_open".to_string(), "09:00".to_string()),
            ("monday_close".to_string(), "18:00".to_string()),
        ];
        pairs.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
        pairs
    }

    #[test]
    fn test_form_builds_seven_days() {
        let input = StoreForm::from_pairs(&pairs(&[
            ("monday_break_start", "13:00"),
            ("monday_break_end", "14:00"),
        ]))
        .to_input(Language::En.labels())
        .unwrap();

        assert_eq!(input.hours.len(), 7);
        let monday = input.hours[0];
        assert!(monday.is_working);
        assert_eq!(monday.break_start, NaiveTime::from_hms_opt(13, 0, 0));
        assert!(!input.hours[1].is_working);
    }

    #[test]
    fn test_rejects_close_before_open() {
        let err = StoreForm::from_pairs(&pairs(&[("monday_close", "08:00")]))
            .to_input(Language::En.labels())
            .unwrap_err();
        assert!(err.starts_with("Mon"));
    }

    #[test]
    fn test_rejects_half_break_and_break_outside_hours() {
        let labels = Language::En.labels();
        assert!(
            StoreForm::from_pairs(&pairs(&[("monday_break_start", "13:00")]))
                .to_input(labels)
                .is_err()
        );
        assert!(
            StoreForm::from_pairs(&pairs(&[
                ("monday_break_start", "17:30"),
                ("monday_break_end", "19:00"),
            ]))
            .to_input(labels)
            .is_err()
        );
    }

    #[test]
    fn test_requires_name_and_city() {
        let form = StoreForm::from_pairs(&[("name".to_string(), "x".to_string())]);
        let err = form.to_input(Language::En.labels()).unwrap_err();
        assert!(err.starts_with("City"));
    }

    #[test]
    fn test_round_trips_existing_store() {
        let store: Store = serde_json::from_value(serde_json::json!({
            "_id": "s1", "name": "Pike Place", "city": "Seattle",
            "hours": [{"day": "friday", "isWorking": true, "open": "10:00", "close": "16:00"}]
        }))
        .unwrap();
        let form = StoreForm::from_store(&store);
        assert!(form.days[4].working);
        assert_eq!(form.days[4].open, "10:00");
        assert!(!form.days[0].working);
        let input = form.to_input(Language::En.labels()).unwrap();
        assert_eq!(input.hours[4].close, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }
}
