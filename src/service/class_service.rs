use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    domain::{
        ClassSession, ClassWithRoster, CreateClassRequest, CreateRecurringClassRequest,
        RosterChange, UpdateClassRequest,
    },
    error::{AppError, Result},
    repository::{AdminRepository, ClassSessionRepository, ClientRepository, RosterApply},
    schedule,
    service::reconcile,
    validation,
};

pub struct ClassService {
    classes: Arc<dyn ClassSessionRepository>,
    clients: Arc<dyn ClientRepository>,
    admins: Arc<dyn AdminRepository>,
}

impl ClassService {
    pub fn new(
        classes: Arc<dyn ClassSessionRepository>,
        clients: Arc<dyn ClientRepository>,
        admins: Arc<dyn AdminRepository>,
    ) -> Self {
        Self {
            classes,
            clients,
            admins,
        }
    }

    async fn ensure_instructor(&self, instructor_id: Uuid) -> Result<()> {
        self.admins
            .find_by_id(instructor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Instructor not found".to_string()))?;
        Ok(())
    }

    pub async fn create_class(&self, request: CreateClassRequest) -> Result<ClassSession> {
        let errors = validation::validate_class_fields(
            &request.title,
            request.capacity,
            request.start_time,
            request.end_time,
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        self.ensure_instructor(request.instructor_id).await?;

        let now = Utc::now();
        let session = ClassSession {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            location: request.location,
            capacity: request.capacity,
            date: request.date,
            start_time: request.date.and_time(request.start_time).and_utc(),
            end_time: request.date.and_time(request.end_time).and_utc(),
            is_cancelled: request.is_cancelled,
            instructor_id: request.instructor_id,
            created_at: now,
            updated_at: now,
        };

        self.classes.create(session).await
    }

    /// Expand a weekday pattern over an inclusive date range into
    /// independent sessions. An inverted range or an empty day set
    /// produces zero sessions without an error; callers see the count.
    pub async fn create_recurring(
        &self,
        request: CreateRecurringClassRequest,
    ) -> Result<Vec<ClassSession>> {
        let errors = validation::validate_recurring_class(
            &request.title,
            request.capacity,
            request.start_time,
            request.end_time,
            &request.days,
        );
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        self.ensure_instructor(request.instructor_id).await?;

        let days: Vec<chrono::Weekday> = request
            .days
            .iter()
            .filter_map(|d| schedule::parse_weekday(d))
            .collect();

        let dates = schedule::expand_weekly(request.start_date, request.end_date, &days);

        let now = Utc::now();
        let sessions: Vec<ClassSession> = dates
            .into_iter()
            .map(|date| ClassSession {
                id: Uuid::new_v4(),
                title: request.title.clone(),
                description: request.description.clone(),
                location: request.location.clone(),
                capacity: request.capacity,
                date,
                start_time: date.and_time(request.start_time).and_utc(),
                end_time: date.and_time(request.end_time).and_utc(),
                is_cancelled: request.is_cancelled,
                instructor_id: request.instructor_id,
                created_at: now,
                updated_at: now,
            })
            .collect();

        if sessions.is_empty() {
            return Ok(Vec::new());
        }

        self.classes.create_many(sessions).await
    }

    pub async fn get_class(&self, id: Uuid) -> Result<ClassWithRoster> {
        // Independent read-only lookups, issued concurrently
        let (session, attendees) =
            tokio::try_join!(self.classes.find_by_id(id), self.classes.roster(id))?;
        let session =
            session.ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

        Ok(ClassWithRoster { session, attendees })
    }

    /// Sessions whose start falls within `[start, end]`, both dates
    /// covered whole. An inverted range is an error here, unlike
    /// recurring expansion.
    pub async fn list_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ClassSession>> {
        if start > end {
            return Err(AppError::BadRequest(
                "Start date must not be after end date".to_string(),
            ));
        }

        let (range_start, _) = schedule::day_bounds(start);
        let (_, range_end) = schedule::day_bounds(end);

        self.classes
            .list_between(range_start.and_utc(), range_end.and_utc())
            .await
    }

    pub async fn list_week(&self, offset: i64) -> Result<Vec<ClassSession>> {
        let (monday, sunday) = schedule::week_bounds(Utc::now().date_naive(), offset);
        self.list_range(monday, sunday).await
    }

    /// Partial scalar patch plus optional full roster replacement. The
    /// scalar update and the roster diff commit in one transaction; on
    /// any validation failure nothing is written.
    pub async fn update_class(
        &self,
        id: Uuid,
        request: UpdateClassRequest,
        acting_admin: Uuid,
    ) -> Result<(ClassWithRoster, Option<RosterChange>)> {
        let existing = self
            .classes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

        let date = request.date.unwrap_or(existing.date);
        let start_tod = request.start_time.unwrap_or_else(|| existing.start_time.time());
        let end_tod = request.end_time.unwrap_or_else(|| existing.end_time.time());

        let merged = ClassSession {
            id: existing.id,
            title: request.title.unwrap_or(existing.title),
            description: request.description.or(existing.description),
            location: request.location.or(existing.location),
            capacity: request.capacity.unwrap_or(existing.capacity),
            date,
            start_time: date.and_time(start_tod).and_utc(),
            end_time: date.and_time(end_tod).and_utc(),
            is_cancelled: request.is_cancelled.unwrap_or(existing.is_cancelled),
            instructor_id: request.instructor_id.unwrap_or(existing.instructor_id),
            created_at: existing.created_at,
            updated_at: existing.updated_at,
        };

        let mut errors = validation::validate_class_fields(
            &merged.title,
            merged.capacity,
            start_tod,
            end_tod,
        );

        if let Some(instructor_id) = request.instructor_id {
            self.ensure_instructor(instructor_id).await?;
        }

        // Roster reconciliation: validate everything up front, then hand
        // the repository only the rows that actually change.
        let mut roster_apply = None;
        let mut change = None;

        if let Some(desired) = request.attendee_ids {
            let desired = reconcile::dedupe_ids(desired);

            if desired.len() as i32 > merged.capacity {
                errors.push(format!(
                    "Roster size {} exceeds class capacity {}",
                    desired.len(),
                    merged.capacity
                ));
            }

            let known = self.clients.existing_ids(&desired).await?;
            let missing: Vec<String> = desired
                .iter()
                .filter(|id| !known.contains(id))
                .map(|id| id.to_string())
                .collect();
            if !missing.is_empty() {
                errors.push(format!("Unknown client ids: {}", missing.join(", ")));
            }

            if errors.is_empty() {
                let current: Vec<Uuid> = self
                    .classes
                    .roster(id)
                    .await?
                    .iter()
                    .map(|log| log.client_id)
                    .collect();

                let diff = reconcile::diff_ids(&current, &desired);
                change = Some(RosterChange {
                    added_count: diff.added.len(),
                    removed_count: diff.removed.len(),
                    kept_count: diff.kept.len(),
                });
                roster_apply = Some(RosterApply {
                    remove: diff.removed,
                    add: diff.added,
                    checked_in_by: acting_admin,
                });
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let updated = self.classes.update_with_roster(merged, roster_apply).await?;
        let attendees = self.classes.roster(id).await?;

        Ok((
            ClassWithRoster {
                session: updated,
                attendees,
            },
            change,
        ))
    }

    /// Record a single check-in, attributed to the acting admin.
    pub async fn check_in(
        &self,
        class_id: Uuid,
        client_id: Uuid,
        acting_admin: Uuid,
    ) -> Result<ClassWithRoster> {
        let session = self
            .classes
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

        self.clients
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let roster = self.classes.roster(class_id).await?;

        if roster.iter().any(|log| log.client_id == client_id) {
            return Err(AppError::Conflict(
                "Client is already checked in to this class".to_string(),
            ));
        }

        if roster.len() as i32 >= session.capacity {
            return Err(AppError::BadRequest("Class is at capacity".to_string()));
        }

        self.classes
            .add_attendance(class_id, client_id, acting_admin)
            .await?;

        self.get_class(class_id).await
    }
}
