//! Store locator.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use bloomway_core::i18n::Labels;
use bloomway_core::models::{Day, DayHours, Store, StoreStatus};
use chrono::{Datelike, NaiveDateTime};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Page;
use crate::routes::catalog::SelectOption;
use crate::state::AppState;

/// One row of a weekly hours table.
#[derive(Debug, Clone)]
pub struct HoursRow {
    pub day: &'static str,
    /// `09:00–18:00`, or the day-off label.
    pub hours: String,
    pub break_time: Option<String>,
    pub is_today: bool,
}

impl HoursRow {
    fn new(hours: &DayHours, labels: &Labels, today: bool) -> Self {
        let working = hours.is_working && hours.open < hours.close;
        Self {
            day: hours.day.short(),
            hours: if working {
                format!("{}\u{2013}{}", hours.open.format("%H:%M"), hours.close.format("%H:%M"))
            } else {
                labels.day_off.to_string()
            },
            break_time: match (working, hours.break_start, hours.break_end) {
                (true, Some(start), Some(end)) if start < end => {
                    Some(format!("{}\u{2013}{}", start.format("%H:%M"), end.format("%H:%M")))
                }
                _ => None,
            },
            is_today: today,
        }
    }
}

/// Store display data for templates.
#[derive(Debug, Clone)]
pub struct StoreView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub status: &'static str,
    /// CSS modifier: `open`, `break` or `closed`.
    pub status_class: &'static str,
    pub hours: Vec<HoursRow>,
}

impl StoreView {
    #[must_use]
    pub fn new(store: &Store, labels: &Labels, now: NaiveDateTime) -> Self {
        let status = store.status_at(now);
        let today = Day::from(now.weekday());
        Self {
            id: store.id.to_string(),
            name: store.name.clone(),
            address: store.address.clone(),
            city: store.city.clone(),
            phone: store.phone.clone(),
            status: labels.store_status(status),
            status_class: match status {
                StoreStatus::Open => "open",
                StoreStatus::OnBreak => "break",
                StoreStatus::Closed => "closed",
            },
            hours: store
                .weekly_hours()
                .iter()
                .map(|h| HoursRow::new(h, labels, h.day == today))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresQuery {
    pub city: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "stores.html")]
pub struct StoresTemplate {
    pub page: Page,
    pub cities: Vec<SelectOption>,
    pub stores: Vec<StoreView>,
}

/// Local wall-clock time used for open/closed badges.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Store list with an optional city filter.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<StoresQuery>,
) -> Result<StoresTemplate> {
    let stores = state.api().stores().await?;
    let city = query.city.filter(|c| !c.trim().is_empty());
    let now = local_now();

    let cities = stores
        .iter()
        .map(|s| s.city.clone())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|c| SelectOption {
            selected: city.as_deref() == Some(c.as_str()),
            label: c.clone(),
            value: c,
        })
        .collect();

    let stores = stores
        .iter()
        .filter(|s| city.as_deref().is_none_or(|c| s.city == c))
        .map(|s| StoreView::new(s, page.labels, now))
        .collect();

    Ok(StoresTemplate {
        page,
        cities,
        stores,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bloomway_core::i18n::Language;
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_store_view_marks_today_and_status() {
        let store: Store = serde_json::from_value(serde_json::json!({
            "_id": "s1",
            "name": "Pike Place",
            "city": "Seattle",
            "hours": [
                {"day": "monday", "isWorking": true, "open": "09:00", "close": "18:00",
                 "breakStart": "13:00", "breakEnd": "14:00"}
            ]
        }))
        .unwrap();
        // 2024-01-01 was a Monday
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        let labels = Language::En.labels();
        let view = StoreView::new(&store, labels, at);

        assert_eq!(view.status, labels.on_break);
        assert_eq!(view.status_class, "break");
        assert!(view.hours[0].is_today);
        assert_eq!(view.hours[0].hours, "09:00\u{2013}18:00");
        assert_eq!(view.hours[0].break_time.as_deref(), Some("13:00\u{2013}14:00"));
        assert_eq!(view.hours[1].hours, labels.day_off);
    }
}
