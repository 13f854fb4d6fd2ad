//! Recording and retrieval of categorized weekly events.

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use grudge_db::models::EventRow;
use grudge_db::{Database, time};
use grudge_types::models::{Category, Event, EventKind};

use crate::visibility::VisibilityGate;
use crate::week;
use crate::{Error, Result};

/// Default lookback window, in weeks.
pub const DEFAULT_WEEKS_BACK: u32 = 8;

pub struct EventLog<'a> {
    db: &'a Database,
}

impl<'a> EventLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Records an event for `user_id`, stamping `created_at` and the derived
    /// `week_start` from the current clock.
    pub fn record_event(
        &self,
        user_id: Uuid,
        kind: EventKind,
        category: Category,
        note: Option<String>,
        is_shared: bool,
    ) -> Result<Event> {
        self.record_event_at(user_id, kind, category, note, is_shared, Utc::now())
    }

    /// Clock-explicit variant of [`record_event`](Self::record_event).
    pub fn record_event_at(
        &self,
        user_id: Uuid,
        kind: EventKind,
        category: Category,
        note: Option<String>,
        is_shared: bool,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        if category.kind() != kind {
            return Err(Error::Validation(format!(
                "invalid category {:?} for kind {:?}",
                category.as_str(),
                kind.as_str()
            )));
        }

        let event = Event {
            id: Uuid::new_v4(),
            user_id,
            kind,
            category,
            note: note.filter(|n| !n.trim().is_empty()),
            is_shared,
            week_start: week::week_start(now),
            created_at: now,
        };

        self.db.insert_event(&to_row(&event))?;

        Ok(event)
    }

    /// The caller's own events of one kind, newest first, restricted to
    /// week buckets within the lookback window. `weeks_back` of 0 means the
    /// current week only.
    pub fn list_own_events(
        &self,
        user_id: Uuid,
        kind: EventKind,
        weeks_back: u32,
    ) -> Result<Vec<Event>> {
        self.list_own_events_at(user_id, kind, weeks_back, Utc::now())
    }

    pub fn list_own_events_at(
        &self,
        user_id: Uuid,
        kind: EventKind,
        weeks_back: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let cutoff = cutoff(now, weeks_back);
        let rows = self.db.get_events(
            &user_id.to_string(),
            kind.as_str(),
            &time::encode(cutoff),
            false,
        )?;

        rows.into_iter().map(from_row).collect()
    }

    /// A friend's shared events. Fails `Forbidden` unless the visibility
    /// gate lets `viewer` see `target`; unshared events are never returned
    /// even then.
    pub fn list_shared_events(
        &self,
        viewer: Uuid,
        target: Uuid,
        kind: EventKind,
        weeks_back: u32,
    ) -> Result<Vec<Event>> {
        self.list_shared_events_at(viewer, target, kind, weeks_back, Utc::now())
    }

    pub fn list_shared_events_at(
        &self,
        viewer: Uuid,
        target: Uuid,
        kind: EventKind,
        weeks_back: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        if !VisibilityGate::new(self.db).is_visible(viewer, target)? {
            return Err(Error::Forbidden);
        }

        let cutoff = cutoff(now, weeks_back);
        let rows = self.db.get_events(
            &target.to_string(),
            kind.as_str(),
            &time::encode(cutoff),
            true,
        )?;

        rows.into_iter().map(from_row).collect()
    }
}

fn cutoff(now: DateTime<Utc>, weeks_back: u32) -> DateTime<Utc> {
    // A window reaching past the calendar's start means "everything".
    match now.checked_sub_signed(Duration::days(7 * i64::from(weeks_back))) {
        Some(t) => week::week_start(t),
        None => DateTime::<Utc>::MIN_UTC,
    }
}

fn to_row(event: &Event) -> EventRow {
    EventRow {
        id: event.id.to_string(),
        user_id: event.user_id.to_string(),
        kind: event.kind.as_str().to_string(),
        category: event.category.as_str().to_string(),
        note: event.note.clone(),
        is_shared: event.is_shared,
        week_start: time::encode(event.week_start),
        created_at: time::encode(event.created_at),
    }
}

fn from_row(row: EventRow) -> Result<Event> {
    let kind = EventKind::parse(&row.kind)
        .ok_or_else(|| anyhow!("unknown event kind in database: {:?}", row.kind))?;
    let category = Category::parse(&row.category)
        .ok_or_else(|| anyhow!("unknown category in database: {:?}", row.category))?;

    Ok(Event {
        id: row.id.parse().map_err(|e| anyhow!("bad event id: {e}"))?,
        user_id: row
            .user_id
            .parse()
            .map_err(|e| anyhow!("bad user id on event {}: {e}", row.id))?,
        kind,
        category,
        note: row.note,
        is_shared: row.is_shared,
        week_start: time::decode(&row.week_start)?,
        created_at: time::decode(&row.created_at)?,
    })
}
