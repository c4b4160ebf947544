//! `stores`: list stores with their opening status.

use bloomway_core::models::{Store, StoreStatus};
use chrono::NaiveDateTime;

use super::{CommandError, public_client};

/// Stores passing the `--open-now` and `--city` flags at `now`.
#[must_use]
pub fn select<'a>(
    stores: &'a [Store],
    open_now: bool,
    city: Option<&str>,
    now: NaiveDateTime,
) -> Vec<&'a Store> {
    stores
        .iter()
        .filter(|s| city.is_none_or(|c| s.city.eq_ignore_ascii_case(c)))
        .filter(|s| !open_now || s.is_open_at(now))
        .collect()
}

const fn status_text(status: StoreStatus) -> &'static str {
    match status {
        StoreStatus::Open => "open",
        StoreStatus::OnBreak => "on break",
        StoreStatus::Closed => "closed",
    }
}

pub async fn list(open_now: bool, city: Option<&str>) -> Result<(), CommandError> {
    let api = public_client()?;
    let stores = api.stores().await?;
    let now = chrono::Local::now().naive_local();

    let selected = select(&stores, open_now, city, now);
    tracing::info!("{} of {} stores", selected.len(), stores.len());
    for store in selected {
        tracing::info!(
            "{:<9} {}, {} ({})  [{}]",
            status_text(store.status_at(now)),
            store.name,
            store.city,
            store.address,
            store.id
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_select_open_now_and_city() {
        let stores: Vec<Store> = serde_json::from_value(serde_json::json!([
            {"_id": "a", "name": "Early", "city": "Seattle", "hours": [
                {"day": "monday", "isWorking": true, "open": "07:00", "close": "12:00"}
            ]},
            {"_id": "b", "name": "Late", "city": "seattle", "hours": [
                {"day": "monday", "isWorking": true, "open": "12:00", "close": "20:00"}
            ]},
            {"_id": "c", "name": "Elsewhere", "city": "Portland"}
        ]))
        .unwrap();
        // 2024-01-01 was a Monday
        let morning = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let open: Vec<_> = select(&stores, true, None, morning)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(open, vec!["Early"]);
        assert_eq!(select(&stores, false, Some("Seattle"), morning).len(), 2);
    }
}
