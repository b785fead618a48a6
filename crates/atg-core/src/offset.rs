//! Offset tracking for `getUpdates`.
//!
//! The tracker remembers the highest update id seen and, when autoincrement is
//! on, asks only for updates strictly after it. It is only advanced after a
//! batch was fetched and decoded successfully, so a failed fetch re-delivers.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{domain::UpdateId, gateway::Api, update::Update, Result};

/// Caller-supplied `getUpdates` parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GetUpdates {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "offset_as_string"
    )]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<String>>,
}

fn offset_as_string<S: Serializer>(
    offset: &Option<i64>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match offset {
        Some(o) => s.serialize_str(&o.to_string()),
        None => s.serialize_none(),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OffsetTracker {
    autoincrement: bool,
    latest_seen: i64,
}

impl OffsetTracker {
    pub fn new(autoincrement: bool) -> Self {
        Self {
            autoincrement,
            latest_seen: 0,
        }
    }

    pub fn autoincrement(&self) -> bool {
        self.autoincrement
    }

    pub fn latest_seen(&self) -> i64 {
        self.latest_seen
    }

    /// Parameters to actually send for the next fetch.
    pub fn prepare(&self, mut params: GetUpdates) -> GetUpdates {
        if self.autoincrement {
            params.offset = (self.latest_seen > 0).then_some(self.latest_seen.saturating_add(1));
        }
        params
    }

    /// Raise `latest_seen` to the highest of `ids`. Never lowers it.
    pub fn observe(&mut self, ids: impl IntoIterator<Item = UpdateId>) {
        if let Some(UpdateId(id)) = ids.into_iter().max() {
            self.latest_seen = self.latest_seen.max(id);
        }
    }
}

/// Fetches update batches and keeps the offset tracker current.
#[derive(Debug)]
pub struct UpdatePoller {
    api: Api,
    tracker: OffsetTracker,
}

impl UpdatePoller {
    pub fn new(api: Api, autoincrement: bool) -> Self {
        Self {
            api,
            tracker: OffsetTracker::new(autoincrement),
        }
    }

    pub fn tracker(&self) -> &OffsetTracker {
        &self.tracker
    }

    pub fn set_autoincrement(&mut self, enabled: bool) {
        self.tracker.autoincrement = enabled;
    }

    pub async fn fetch(&mut self, params: &GetUpdates) -> Result<Vec<Update>> {
        let params = self.tracker.prepare(params.clone());
        // Items are parsed one by one so a single odd update cannot fail the
        // whole batch and pin the offset.
        let raw: Vec<Value> = self.api.invoke_as("getUpdates", &params).await?;
        let mut updates = Vec::with_capacity(raw.len());
        for item in raw {
            match serde_json::from_value::<Update>(item) {
                Ok(update) => updates.push(update),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping update without a usable update_id")
                }
            }
        }
        self.tracker.observe(updates.iter().map(|u| u.id));
        tracing::debug!(
            count = updates.len(),
            latest_seen = self.tracker.latest_seen,
            "fetched updates"
        );
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(raw: &[i64]) -> Vec<UpdateId> {
        raw.iter().copied().map(UpdateId).collect()
    }

    #[test]
    fn first_fetch_keeps_caller_params_but_drops_offset() {
        let t = OffsetTracker::new(true);
        let p = t.prepare(GetUpdates {
            offset: Some(99),
            limit: Some(10),
            ..Default::default()
        });
        assert_eq!(p.offset, None);
        assert_eq!(p.limit, Some(10));
    }

    #[test]
    fn autoincrement_requests_after_latest_seen() {
        let mut t = OffsetTracker::new(true);
        t.observe(ids(&[5, 7, 6]));
        assert_eq!(t.latest_seen(), 7);

        let p = t.prepare(GetUpdates {
            offset: Some(1),
            ..Default::default()
        });
        assert_eq!(p.offset, Some(8));
    }

    #[test]
    fn latest_seen_never_decreases() {
        let mut t = OffsetTracker::new(true);
        t.observe(ids(&[10]));
        t.observe(ids(&[3, 4]));
        t.observe(ids(&[]));
        assert_eq!(t.latest_seen(), 10);
        t.observe(ids(&[12]));
        assert_eq!(t.latest_seen(), 12);
    }

    #[test]
    fn offset_saturates_at_max_update_id() {
        let mut t = OffsetTracker::new(true);
        t.observe(ids(&[i64::MAX]));
        assert_eq!(t.prepare(GetUpdates::default()).offset, Some(i64::MAX));
    }

    #[test]
    fn disabled_autoincrement_passes_caller_offset_through() {
        let mut t = OffsetTracker::new(false);
        t.observe(ids(&[10]));
        let p = t.prepare(GetUpdates {
            offset: Some(3),
            ..Default::default()
        });
        assert_eq!(p.offset, Some(3));
        assert_eq!(t.prepare(GetUpdates::default()).offset, None);
    }

    #[test]
    fn offset_is_string_encoded_and_none_fields_omitted() {
        let v = serde_json::to_value(GetUpdates {
            offset: Some(8),
            timeout: Some(30),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(v, json!({"offset": "8", "timeout": 30}));
        assert_eq!(
            serde_json::to_value(GetUpdates::default()).unwrap(),
            json!({})
        );
    }
}
