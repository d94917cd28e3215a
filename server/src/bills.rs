//! Bills-page controller: fetch from the store, order most recent first,
//! format for display.

use entity::bills;
use platform_store::{BillStore, StoreResult};
use uuid::Uuid;

use crate::format::{format_date, format_status};

/// One row of the bills table, ready for rendering.
#[derive(Clone, Debug)]
pub struct BillCard {
    pub id: Uuid,
    pub expense_type: String,
    pub name: String,
    /// Raw date string as stored; kept for the `data-date` attribute.
    pub date_raw: String,
    pub date_display: String,
    pub amount: Option<i32>,
    pub status_display: String,
    pub file_url: String,
}

impl BillCard {
    fn from_model(model: bills::Model) -> Self {
        let date_raw = model.date.unwrap_or_default();
        Self {
            id: model.id,
            expense_type: model.expense_type.unwrap_or_default(),
            name: model.name.unwrap_or_default(),
            date_display: format_date(&date_raw),
            date_raw,
            amount: model.amount,
            status_display: format_status(&model.status),
            file_url: model.file_url,
        }
    }
}

/// List the bills, most recent date first. Sorting happens on the raw
/// ISO-ish strings, so valid dates order chronologically and malformed
/// ones fall wherever the string comparison puts them.
pub async fn load_bills(store: &dyn BillStore) -> StoreResult<Vec<BillCard>> {
    let mut rows = store.list().await?;
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(rows.into_iter().map(BillCard::from_model).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::is_display_date;
    use platform_store::mock::MockStore;

    #[tokio::test]
    async fn bills_are_ordered_most_recent_first() {
        let store = MockStore::new();
        let cards = load_bills(&store).await.expect("fixtures");
        let dates: Vec<&str> = cards
            .iter()
            .map(|card| card.date_raw.as_str())
            .filter(|raw| is_display_date(raw))
            .collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert_eq!(dates.first(), Some(&"2004-04-04"));
    }

    #[tokio::test]
    async fn malformed_dates_survive_formatting() {
        let store = MockStore::new();
        let mut cards = load_bills(&store).await.expect("fixtures");
        cards[0].date_raw = "garbage".to_string();
        let display = format_date(&cards[0].date_raw);
        assert_eq!(display, "garbage");
    }

    #[tokio::test]
    async fn statuses_come_back_localized() {
        let store = MockStore::new();
        let cards = load_bills(&store).await.expect("fixtures");
        assert!(cards.iter().any(|c| c.status_display == "En attente"));
        assert!(cards.iter().any(|c| c.status_display == "Refusé"));
        assert!(cards.iter().any(|c| c.status_display == "Accepté"));
    }
}
