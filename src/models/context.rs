use crate::core::lifecycle::LifecycleLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::entry::EntryView;

/// What the operator is currently looking at.
///
/// Passed explicitly into listing, filtering and export instead of being
/// read from shared mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewContext {
    #[default]
    None,
    Event {
        event_id: i64,
    },
    Session {
        event_id: i64,
        session_id: i64,
    },
}

impl ViewContext {
    /// Resolve a context from optional CLI ids. A session wins over an event.
    pub fn resolve(
        pool: &DbPool,
        event_id: Option<i64>,
        session_id: Option<i64>,
    ) -> AppResult<Self> {
        if let Some(sid) = session_id {
            let session = LifecycleLogic::get_session(pool, sid)?;
            return Ok(ViewContext::Session {
                event_id: session.event_id,
                session_id: session.id,
            });
        }

        if let Some(eid) = event_id {
            let event = LifecycleLogic::get_event(pool, eid)?;
            return Ok(ViewContext::Event { event_id: event.id });
        }

        Ok(ViewContext::None)
    }

    /// Load the unfiltered entry set for this context.
    pub fn load_entries(&self, pool: &DbPool) -> AppResult<Vec<EntryView>> {
        match self {
            ViewContext::None => Ok(Vec::new()),
            ViewContext::Event { event_id } => {
                LifecycleLogic::list_entries_for_event(pool, *event_id)
            }
            ViewContext::Session { session_id, .. } => {
                LifecycleLogic::list_entries_for_session(pool, *session_id)
            }
        }
    }

    /// Human readable label, e.g. `Session: Morning` or `Event: Seminar`.
    pub fn label(&self, pool: &DbPool) -> AppResult<String> {
        match self {
            ViewContext::None => Err(AppError::Validation(
                "select an event or a session first".into(),
            )),
            ViewContext::Event { event_id } => {
                let ev = LifecycleLogic::get_event(pool, *event_id)?;
                Ok(format!("Event: {}", ev.name))
            }
            ViewContext::Session { session_id, .. } => {
                let s = LifecycleLogic::get_session(pool, *session_id)?;
                Ok(format!("Session: {}", s.name))
            }
        }
    }
}
