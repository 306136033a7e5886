use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::availability::available_staff;
use super::cluster::{cluster_day, DayClusters};
use super::conflict::{event_conflicts, ConflictSource};
use super::status::event_status;
use super::time_utils::overlaps;
use super::types::{Event, EventStatus, EventSummary, StaffAssignment, StaffProfile, StaffRef};

/// Errors reported by board operations. Every failure is surfaced to the
/// caller; the only locally-recovered condition in the engine is a
/// malformed time string (see `time_utils::parse_minutes`).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum BoardError {
    #[error("unknown event {0}")]
    UnknownEvent(u32),
    #[error("event {event_id} has no role {role:?}")]
    UnknownRole { event_id: u32, role: String },
    #[error("staff {staff_id} is not assigned to event {event_id}")]
    UnknownStaff { event_id: u32, staff_id: u32 },
    #[error("event {event_id} already has a role {role:?}")]
    DuplicateRole { event_id: u32, role: String },
    #[error("role slot count must be at least 1")]
    InvalidCount,
    #[error("{assigned} staff currently hold role {role:?}, cannot shrink below that")]
    WouldOrphanAssignments { role: String, assigned: u32 },
    #[error("mutation based on revision {submitted} but the collection is at {current}; re-fetch and retry")]
    StaleRevision { current: u64, submitted: u64 },
    #[error("operation is destructive and requires explicit confirmation")]
    ConfirmationRequired,
    #[error("no move decision is pending")]
    NoPendingMove,
}

/// Why a candidate was not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    AlreadyAssigned,
    OverCapacity,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedCandidate {
    pub staff: StaffRef,
    pub reason: RejectionReason,
}

/// One conflicted candidate held in a pending move decision, with the
/// events that would have to give them up.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictedCandidate {
    pub staff: StaffRef,
    pub conflicting_events: Vec<EventSummary>,
}

/// A deferred assignment awaiting operator confirmation. Confirming moves
/// the chosen staff out of their conflicting events and into the target
/// event; cancelling leaves every event untouched.
#[derive(Debug, Clone, Serialize)]
pub struct PendingMove {
    pub event_id: u32,
    pub role: String,
    pub candidates: Vec<ConflictedCandidate>,
}

/// Outcome of an `assign` call. Clean candidates are already committed;
/// conflicted ones are parked on the board as the pending decision.
#[derive(Debug, Clone, Serialize)]
pub struct AssignOutcome {
    pub assigned: Vec<StaffRef>,
    pub rejected: Vec<RejectedCandidate>,
    pub pending: Option<PendingMove>,
    pub updated: Vec<Event>,
    pub revision: u64,
}

/// Outcome of a confirmed move: every event touched by the batch, in one
/// logical transaction from the caller's point of view.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub moved: Vec<StaffRef>,
    pub rejected: Vec<RejectedCandidate>,
    pub updated: Vec<Event>,
    pub revision: u64,
}

/// Per-day status counts for the calendar overview.
#[derive(Debug, Clone, Serialize)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub total: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub conflict: usize,
}

/// Single owner of the event collection.
///
/// All cross-event mutation funnels through here so the move workflow can
/// update several events as one batch, and so every mutation is guarded
/// by one revision check. Mutating calls take the caller's last-seen
/// revision; a mismatch rejects the call without touching anything, and a
/// successful mutation bumps the revision.
#[derive(Debug, Default)]
pub struct EventBoard {
    events: Vec<Event>,
    revision: u64,
    pending: Option<PendingMove>,
}

impl EventBoard {
    pub fn new(events: Vec<Event>) -> Self {
        EventBoard {
            events,
            revision: 0,
            pending: None,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending_move(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    pub fn event(&self, event_id: u32) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.date == date)
            .cloned()
            .collect()
    }

    /// Replaces the whole collection (CSV upload, mock regeneration).
    /// Any pending move decision refers to the old collection and is
    /// dropped with it.
    pub fn replace(&mut self, events: Vec<Event>) {
        self.events = events;
        self.pending = None;
        self.revision += 1;
    }

    // Read pipeline, recomputed from the current collection on every call.

    pub fn day_clusters(&self, date: NaiveDate) -> DayClusters {
        cluster_day(&self.events_on(date))
    }

    pub fn status_of(&self, event_id: u32) -> Result<EventStatus, BoardError> {
        let event = self
            .event(event_id)
            .ok_or(BoardError::UnknownEvent(event_id))?;
        Ok(event_status(event, &self.events))
    }

    pub fn conflicts_of(&self, event_id: u32) -> Result<Vec<ConflictSource>, BoardError> {
        let event = self
            .event(event_id)
            .ok_or(BoardError::UnknownEvent(event_id))?;
        Ok(event_conflicts(event, &self.events))
    }

    pub fn availability_for(&self, event_id: u32) -> Result<Vec<StaffProfile>, BoardError> {
        let event = self
            .event(event_id)
            .ok_or(BoardError::UnknownEvent(event_id))?;
        Ok(available_staff(event, &self.all_staff(), &self.events))
    }

    /// Every distinct staff member appearing in any assignment, keyed by
    /// id (first name seen wins), ordered by id.
    pub fn all_staff(&self) -> Vec<StaffRef> {
        let mut by_id: BTreeMap<u32, String> = BTreeMap::new();
        for event in &self.events {
            for staff in &event.assigned_staff {
                by_id.entry(staff.id).or_insert_with(|| staff.name.clone());
            }
        }
        by_id
            .into_iter()
            .map(|(id, name)| StaffRef { id, name })
            .collect()
    }

    pub fn companies(&self) -> Vec<String> {
        let set: BTreeSet<String> = self.events.iter().map(|e| e.company.clone()).collect();
        set.into_iter().collect()
    }

    pub fn event_types(&self) -> Vec<String> {
        let set: BTreeSet<String> = self.events.iter().map(|e| e.event_type.clone()).collect();
        set.into_iter().collect()
    }

    /// Per-day event and status counts for every day in the range that
    /// has at least one event.
    pub fn day_overview(&self, from: NaiveDate, to: NaiveDate) -> Vec<DayOverview> {
        let mut days: BTreeMap<NaiveDate, DayOverview> = BTreeMap::new();
        for event in &self.events {
            if event.date < from || event.date > to {
                continue;
            }
            let entry = days.entry(event.date).or_insert_with(|| DayOverview {
                date: event.date,
                total: 0,
                complete: 0,
                incomplete: 0,
                conflict: 0,
            });
            entry.total += 1;
            match event_status(event, &self.events) {
                EventStatus::Complete => entry.complete += 1,
                EventStatus::Incomplete => entry.incomplete += 1,
                EventStatus::Conflict => entry.conflict += 1,
            }
        }
        days.into_values().collect()
    }

    // Mutation protocol.

    /// Assigns candidates to a role on an event.
    ///
    /// Candidates with no conflicting commitments are committed
    /// immediately. Candidates already booked on another same-day
    /// overlapping event are never assigned silently; they are parked in
    /// a pending move decision that names each conflicting event and
    /// waits for `confirm_move` or `cancel_move`. Candidates that would
    /// exceed the role's slot count are rejected individually, never the
    /// whole batch.
    pub fn assign(
        &mut self,
        revision: u64,
        event_id: u32,
        role: &str,
        candidates: Vec<StaffRef>,
    ) -> Result<AssignOutcome, BoardError> {
        self.check_revision(revision)?;
        let idx = self.event_index(event_id)?;
        let required = match self.events[idx].required_staff.get(role) {
            Some(&count) => count,
            None => {
                return Err(BoardError::UnknownRole {
                    event_id,
                    role: role.to_string(),
                })
            }
        };

        if let Some(old) = self.pending.take() {
            log::warn!(
                "new assign on event {} replaces the pending move for event {}",
                event_id,
                old.event_id
            );
        }

        let (target_date, target_start, target_end) = {
            let target = &self.events[idx];
            (target.date, target.start_minutes(), target.end_minutes())
        };

        // Slots left on the role; only committed candidates consume one
        // here. Conflicted candidates are re-checked at confirm time.
        let mut remaining =
            required.saturating_sub(self.events[idx].assigned_count_for(role) as u32);

        let mut assigned: Vec<StaffRef> = Vec::new();
        let mut rejected: Vec<RejectedCandidate> = Vec::new();
        let mut conflicted: Vec<ConflictedCandidate> = Vec::new();

        for candidate in candidates {
            if self.events[idx].has_staff(candidate.id) {
                rejected.push(RejectedCandidate {
                    staff: candidate,
                    reason: RejectionReason::AlreadyAssigned,
                });
                continue;
            }
            if remaining == 0 {
                rejected.push(RejectedCandidate {
                    staff: candidate,
                    reason: RejectionReason::OverCapacity,
                });
                continue;
            }

            let conflicting_events: Vec<EventSummary> = self
                .events
                .iter()
                .filter(|other| {
                    other.id != event_id
                        && other.date == target_date
                        && other.has_staff(candidate.id)
                        && overlaps(
                            target_start,
                            target_end,
                            other.start_minutes(),
                            other.end_minutes(),
                        )
                })
                .map(|other| other.summary())
                .collect();

            if conflicting_events.is_empty() {
                self.events[idx].assigned_staff.push(StaffAssignment {
                    id: candidate.id,
                    name: candidate.name.clone(),
                    role: role.to_string(),
                });
                remaining -= 1;
                assigned.push(candidate);
            } else {
                conflicted.push(ConflictedCandidate {
                    staff: candidate,
                    conflicting_events,
                });
            }
        }

        let pending = if conflicted.is_empty() {
            None
        } else {
            Some(PendingMove {
                event_id,
                role: role.to_string(),
                candidates: conflicted,
            })
        };
        self.pending = pending.clone();

        let updated = if assigned.is_empty() {
            Vec::new()
        } else {
            self.revision += 1;
            log::info!(
                "assigned {} staff to role {:?} on event {}",
                assigned.len(),
                role,
                event_id
            );
            vec![self.events[idx].clone()]
        };

        Ok(AssignOutcome {
            assigned,
            rejected,
            pending,
            updated,
            revision: self.revision,
        })
    }

    /// Applies the pending move decision for the chosen candidates.
    ///
    /// Each chosen candidate is removed from every event named as a
    /// conflict source and added to the target event with the decision's
    /// role. The removals and the addition are reported as one batch of
    /// updated events. Capacity is re-checked per candidate at commit
    /// time; candidates that no longer fit are rejected individually.
    /// Candidates not chosen are dropped without any mutation.
    pub fn confirm_move(
        &mut self,
        revision: u64,
        chosen_ids: &[u32],
    ) -> Result<MoveOutcome, BoardError> {
        self.check_revision(revision)?;
        let pending = self.pending.take().ok_or(BoardError::NoPendingMove)?;
        let idx = self.event_index(pending.event_id)?;
        let role = pending.role;
        let required = match self.events[idx].required_staff.get(&role) {
            Some(&count) => count,
            None => {
                return Err(BoardError::UnknownRole {
                    event_id: pending.event_id,
                    role,
                })
            }
        };

        let mut remaining =
            required.saturating_sub(self.events[idx].assigned_count_for(&role) as u32);

        let mut moved: Vec<StaffRef> = Vec::new();
        let mut rejected: Vec<RejectedCandidate> = Vec::new();
        let mut touched: HashSet<u32> = HashSet::new();

        for candidate in pending.candidates {
            if !chosen_ids.contains(&candidate.staff.id) {
                continue;
            }
            if remaining == 0 {
                rejected.push(RejectedCandidate {
                    staff: candidate.staff,
                    reason: RejectionReason::OverCapacity,
                });
                continue;
            }

            for source in &candidate.conflicting_events {
                if let Some(other) = self.events.iter_mut().find(|e| e.id == source.id) {
                    other.assigned_staff.retain(|s| s.id != candidate.staff.id);
                    touched.insert(other.id);
                }
            }
            self.events[idx].assigned_staff.push(StaffAssignment {
                id: candidate.staff.id,
                name: candidate.staff.name.clone(),
                role: role.clone(),
            });
            touched.insert(pending.event_id);
            remaining -= 1;
            moved.push(candidate.staff);
        }

        if !moved.is_empty() {
            self.revision += 1;
            log::info!(
                "moved {} staff into role {:?} on event {} ({} events updated)",
                moved.len(),
                role,
                pending.event_id,
                touched.len()
            );
        }

        let updated: Vec<Event> = self
            .events
            .iter()
            .filter(|e| touched.contains(&e.id))
            .cloned()
            .collect();

        Ok(MoveOutcome {
            moved,
            rejected,
            updated,
            revision: self.revision,
        })
    }

    /// Drops the pending move decision without mutating any event.
    /// Returns whether a decision was actually pending. A cancelled
    /// decision cannot be resumed; the caller re-initiates via `assign`.
    pub fn cancel_move(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Removes the single matching assignment from one event. No
    /// cross-event effect.
    pub fn unassign(
        &mut self,
        revision: u64,
        event_id: u32,
        staff_id: u32,
    ) -> Result<Vec<Event>, BoardError> {
        self.check_revision(revision)?;
        let idx = self.event_index(event_id)?;
        let pos = self.events[idx]
            .assigned_staff
            .iter()
            .position(|s| s.id == staff_id)
            .ok_or(BoardError::UnknownStaff { event_id, staff_id })?;
        self.events[idx].assigned_staff.remove(pos);
        self.revision += 1;
        Ok(vec![self.events[idx].clone()])
    }

    /// Removes every assignment holding the role from one event.
    pub fn clear_role(
        &mut self,
        revision: u64,
        event_id: u32,
        role: &str,
    ) -> Result<Vec<Event>, BoardError> {
        self.check_revision(revision)?;
        let idx = self.event_index(event_id)?;
        if !self.events[idx].required_staff.contains_key(role) {
            return Err(BoardError::UnknownRole {
                event_id,
                role: role.to_string(),
            });
        }
        let before = self.events[idx].assigned_staff.len();
        self.events[idx].assigned_staff.retain(|s| s.role != role);
        if self.events[idx].assigned_staff.len() != before {
            self.revision += 1;
        }
        Ok(vec![self.events[idx].clone()])
    }

    /// Changes the slot count of an existing role.
    ///
    /// Shrinking below the currently-assigned count is rejected so that
    /// no assignment is silently orphaned. A new count of 0 is a delete
    /// request and must go through `delete_role` with confirmation.
    pub fn resize_role(
        &mut self,
        revision: u64,
        event_id: u32,
        role: &str,
        new_count: u32,
    ) -> Result<Vec<Event>, BoardError> {
        self.check_revision(revision)?;
        let idx = self.event_index(event_id)?;
        if !self.events[idx].required_staff.contains_key(role) {
            return Err(BoardError::UnknownRole {
                event_id,
                role: role.to_string(),
            });
        }
        let assigned = self.events[idx].assigned_count_for(role) as u32;
        if new_count < assigned {
            return Err(BoardError::WouldOrphanAssignments {
                role: role.to_string(),
                assigned,
            });
        }
        if new_count == 0 {
            return Err(BoardError::ConfirmationRequired);
        }
        self.events[idx]
            .required_staff
            .insert(role.to_string(), new_count);
        self.revision += 1;
        Ok(vec![self.events[idx].clone()])
    }

    /// Deletes a role from an event, unassigning everyone holding it.
    /// Destructive, so the caller must pass `confirmed = true`; without
    /// it nothing is touched and the caller is told to confirm.
    pub fn delete_role(
        &mut self,
        revision: u64,
        event_id: u32,
        role: &str,
        confirmed: bool,
    ) -> Result<Vec<Event>, BoardError> {
        self.check_revision(revision)?;
        let idx = self.event_index(event_id)?;
        if !self.events[idx].required_staff.contains_key(role) {
            return Err(BoardError::UnknownRole {
                event_id,
                role: role.to_string(),
            });
        }
        if !confirmed {
            return Err(BoardError::ConfirmationRequired);
        }
        self.events[idx].required_staff.remove(role);
        self.events[idx].assigned_staff.retain(|s| s.role != role);
        self.revision += 1;
        log::info!("deleted role {:?} from event {}", role, event_id);
        Ok(vec![self.events[idx].clone()])
    }

    /// Adds a new role with the given slot count.
    pub fn add_role(
        &mut self,
        revision: u64,
        event_id: u32,
        role: &str,
        count: u32,
    ) -> Result<Vec<Event>, BoardError> {
        self.check_revision(revision)?;
        let idx = self.event_index(event_id)?;
        if count == 0 {
            return Err(BoardError::InvalidCount);
        }
        if self.events[idx].required_staff.contains_key(role) {
            return Err(BoardError::DuplicateRole {
                event_id,
                role: role.to_string(),
            });
        }
        self.events[idx]
            .required_staff
            .insert(role.to_string(), count);
        self.revision += 1;
        Ok(vec![self.events[idx].clone()])
    }

    fn check_revision(&self, submitted: u64) -> Result<(), BoardError> {
        if submitted != self.revision {
            return Err(BoardError::StaleRevision {
                current: self.revision,
                submitted,
            });
        }
        Ok(())
    }

    fn event_index(&self, event_id: u32) -> Result<usize, BoardError> {
        self.events
            .iter()
            .position(|e| e.id == event_id)
            .ok_or(BoardError::UnknownEvent(event_id))
    }
}
