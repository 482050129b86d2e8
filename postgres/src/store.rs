//! `PostgreSQL` implementation of the raffle store.

use chrono::{DateTime, Utc};
use rifa_core::error::{RaffleError, Result};
use rifa_core::providers::RaffleStore;
use rifa_core::types::{
    DrawId, DrawOutcome, ExtraNumberRequest, FullName, Money, Participant, ParticipantId,
    PhoneNumber, ProofUri, RequestId, RequestStatus, TicketNumber, TicketOrigin,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

/// Schema statements, safe to re-run.
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS participants (
        id UUID PRIMARY KEY,
        full_name TEXT NOT NULL,
        contact TEXT NOT NULL,
        ticket_number INTEGER NOT NULL
            CONSTRAINT participants_number_range CHECK (ticket_number >= 1),
        origin TEXT NOT NULL
            CONSTRAINT participants_origin_check CHECK (origin IN ('direct', 'extra')),
        registered_at TIMESTAMPTZ NOT NULL,
        CONSTRAINT participants_number_key UNIQUE (ticket_number)
    )
    ",
    // One direct registration per contact; extras attach to that identity.
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS participants_direct_contact_key
        ON participants (contact) WHERE origin = 'direct'
    ",
    r"CREATE INDEX IF NOT EXISTS participants_contact_idx ON participants (contact)",
    r"
    CREATE TABLE IF NOT EXISTS extra_requests (
        id UUID PRIMARY KEY,
        requester_name TEXT NOT NULL,
        contact TEXT NOT NULL,
        amount_cents BIGINT NOT NULL,
        extra_count INTEGER NOT NULL,
        proof_uri TEXT NOT NULL,
        status TEXT NOT NULL
            CONSTRAINT extra_requests_status_check
            CHECK (status IN ('pending', 'approved', 'rejected')),
        granted_numbers INTEGER[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL,
        decided_at TIMESTAMPTZ
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS extra_requests_contact_status_idx
        ON extra_requests (contact, status)
    ",
    // The primary key on a constant column caps the table at one row.
    r"
    CREATE TABLE IF NOT EXISTS draw_outcome (
        onerow BOOLEAN PRIMARY KEY DEFAULT TRUE
            CONSTRAINT draw_outcome_single_row CHECK (onerow),
        id UUID NOT NULL,
        winner_id UUID NOT NULL
            CONSTRAINT draw_outcome_winner_fkey REFERENCES participants (id),
        drawn_at TIMESTAMPTZ NOT NULL
    )
    ",
];

/// `PostgreSQL`-backed raffle store.
///
/// Uniqueness and single-shot guarantees live in the schema: a unique
/// constraint on `ticket_number`, a partial unique index on direct
/// contacts, and a single-row guard on `draw_outcome`. Commit methods
/// dispatch on the violated constraint name to produce typed conflicts.
#[derive(Clone)]
pub struct PostgresRaffleStore {
    pool: PgPool,
}

impl PostgresRaffleStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::StoreUnavailable`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| db_error("connect", &e))?;
        Ok(Self::new(pool))
    }

    /// Create the schema if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::StoreUnavailable`] if a statement fails.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("migrate", &e))?;
        }
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn earliest_for_contact(&self, contact: &PhoneNumber) -> Result<Option<Participant>> {
        let row = sqlx::query(
            r"
            SELECT id, full_name, contact, ticket_number, origin, registered_at
            FROM participants
            WHERE contact = $1
            ORDER BY registered_at, ticket_number
            LIMIT 1
            ",
        )
        .bind(contact.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("query earliest contact row", &e))?;

        row.map(|row| participant_from_row(&row)).transpose()
    }
}

impl RaffleStore for PostgresRaffleStore {
    async fn insert_participant(&self, participant: &Participant) -> Result<Participant> {
        let result = sqlx::query(
            r"
            INSERT INTO participants
                (id, full_name, contact, ticket_number, origin, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(participant.id.as_uuid())
        .bind(participant.name.as_str())
        .bind(participant.contact.as_str())
        .bind(number_to_db(participant.number)?)
        .bind(participant.origin.as_str())
        .bind(participant.registered_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(participant.clone()),
            Err(error) => match unique_constraint(&error).as_deref() {
                Some("participants_number_key") => Err(RaffleError::NumberTaken {
                    number: participant.number,
                }),
                Some("participants_direct_contact_key") => {
                    match self.earliest_for_contact(&participant.contact).await? {
                        Some(existing) => Err(RaffleError::ContactAlreadyRegistered {
                            existing: Box::new(existing),
                        }),
                        None => Err(db_error("insert participant", &error)),
                    }
                }
                _ => Err(db_error("insert participant", &error)),
            },
        }
    }

    async fn participants_by_contact(&self, contact: &PhoneNumber) -> Result<Vec<Participant>> {
        let rows = sqlx::query(
            r"
            SELECT id, full_name, contact, ticket_number, origin, registered_at
            FROM participants
            WHERE contact = $1
            ORDER BY registered_at, ticket_number
            ",
        )
        .bind(contact.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("query participants by contact", &e))?;

        rows.iter().map(participant_from_row).collect()
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        let rows = sqlx::query(
            r"
            SELECT id, full_name, contact, ticket_number, origin, registered_at
            FROM participants
            ORDER BY ticket_number
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list participants", &e))?;

        rows.iter().map(participant_from_row).collect()
    }

    async fn remove_participant(&self, id: ParticipantId) -> Result<()> {
        let result = sqlx::query(r"DELETE FROM participants WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    RaffleError::StoreUnavailable(
                        "participant is referenced by the draw outcome".to_string(),
                    )
                } else {
                    db_error("remove participant", &error)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(RaffleError::NotFound);
        }
        Ok(())
    }

    async fn claimed_numbers(&self) -> Result<HashSet<TicketNumber>> {
        let numbers: Vec<i32> = sqlx::query_scalar(r"SELECT ticket_number FROM participants")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("query claimed numbers", &e))?;

        numbers.into_iter().map(number_from_db).collect()
    }

    async fn participant_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(r"SELECT COUNT(*) FROM participants")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("count participants", &e))?;

        u64::try_from(count).map_err(|_| corrupt("negative participant count"))
    }

    async fn insert_request(&self, request: &ExtraNumberRequest) -> Result<ExtraNumberRequest> {
        sqlx::query(
            r"
            INSERT INTO extra_requests
                (id, requester_name, contact, amount_cents, extra_count,
                 proof_uri, status, granted_numbers, created_at, decided_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(request.id.as_uuid())
        .bind(request.name.as_str())
        .bind(request.contact.as_str())
        .bind(amount_to_db(request.amount)?)
        .bind(count_to_db(request.extra_count)?)
        .bind(request.proof.as_str())
        .bind(request.status.as_str())
        .bind(numbers_to_db(&request.granted_numbers)?)
        .bind(request.created_at)
        .bind(request.decided_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert request", &e))?;

        Ok(request.clone())
    }

    async fn request(&self, id: RequestId) -> Result<ExtraNumberRequest> {
        let row = sqlx::query(
            r"
            SELECT id, requester_name, contact, amount_cents, extra_count,
                   proof_uri, status, granted_numbers, created_at, decided_at
            FROM extra_requests
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("query request", &e))?
        .ok_or(RaffleError::NotFound)?;

        request_from_row(&row)
    }

    async fn list_requests(&self) -> Result<Vec<ExtraNumberRequest>> {
        let rows = sqlx::query(
            r"
            SELECT id, requester_name, contact, amount_cents, extra_count,
                   proof_uri, status, granted_numbers, created_at, decided_at
            FROM extra_requests
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list requests", &e))?;

        rows.iter().map(request_from_row).collect()
    }

    async fn pending_request_for_contact(
        &self,
        contact: &PhoneNumber,
    ) -> Result<Option<ExtraNumberRequest>> {
        let row = sqlx::query(
            r"
            SELECT id, requester_name, contact, amount_cents, extra_count,
                   proof_uri, status, granted_numbers, created_at, decided_at
            FROM extra_requests
            WHERE contact = $1 AND status = 'pending'
            ORDER BY created_at
            LIMIT 1
            ",
        )
        .bind(contact.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("query pending request", &e))?;

        row.map(|row| request_from_row(&row)).transpose()
    }

    #[tracing::instrument(skip(self, participants), fields(request = %id))]
    async fn commit_approval(
        &self,
        id: RequestId,
        participants: &[Participant],
        decided_at: DateTime<Utc>,
    ) -> Result<ExtraNumberRequest> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin approval", &e))?;

        // Lock the request row for the duration of the commit.
        let row = sqlx::query(
            r"
            SELECT id, requester_name, contact, amount_cents, extra_count,
                   proof_uri, status, granted_numbers, created_at, decided_at
            FROM extra_requests
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("lock request", &e))?
        .ok_or(RaffleError::NotFound)?;

        let request = request_from_row(&row)?;
        if !request.status.is_pending() {
            return Err(RaffleError::InvalidState {
                status: request.status,
            });
        }

        for participant in participants {
            let result = sqlx::query(
                r"
                INSERT INTO participants
                    (id, full_name, contact, ticket_number, origin, registered_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(participant.id.as_uuid())
            .bind(participant.name.as_str())
            .bind(participant.contact.as_str())
            .bind(number_to_db(participant.number)?)
            .bind(participant.origin.as_str())
            .bind(participant.registered_at)
            .execute(&mut *tx)
            .await;

            if let Err(error) = result {
                // The dropped transaction rolls back every insert so far.
                if unique_constraint(&error).as_deref() == Some("participants_number_key") {
                    return Err(RaffleError::NumberTaken {
                        number: participant.number,
                    });
                }
                return Err(db_error("insert extra participant", &error));
            }
        }

        let granted: Vec<TicketNumber> = participants.iter().map(|p| p.number).collect();
        sqlx::query(
            r"
            UPDATE extra_requests
            SET status = 'approved', granted_numbers = $2, decided_at = $3
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .bind(numbers_to_db(&granted)?)
        .bind(decided_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("stamp approval", &e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit approval", &e))?;

        Ok(ExtraNumberRequest {
            status: RequestStatus::Approved,
            granted_numbers: granted,
            decided_at: Some(decided_at),
            ..request
        })
    }

    #[tracing::instrument(skip(self), fields(request = %id))]
    async fn commit_rejection(
        &self,
        id: RequestId,
        decided_at: DateTime<Utc>,
    ) -> Result<ExtraNumberRequest> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin rejection", &e))?;

        let row = sqlx::query(
            r"
            SELECT id, requester_name, contact, amount_cents, extra_count,
                   proof_uri, status, granted_numbers, created_at, decided_at
            FROM extra_requests
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("lock request", &e))?
        .ok_or(RaffleError::NotFound)?;

        let request = request_from_row(&row)?;
        if !request.status.is_pending() {
            return Err(RaffleError::InvalidState {
                status: request.status,
            });
        }

        sqlx::query(
            r"
            UPDATE extra_requests
            SET status = 'rejected', decided_at = $2
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .bind(decided_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("stamp rejection", &e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit rejection", &e))?;

        Ok(ExtraNumberRequest {
            status: RequestStatus::Rejected,
            decided_at: Some(decided_at),
            ..request
        })
    }

    async fn draw_outcome(&self) -> Result<Option<DrawOutcome>> {
        let row = sqlx::query(r"SELECT id, winner_id, drawn_at FROM draw_outcome")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("query draw outcome", &e))?;

        row.map(|row| outcome_from_row(&row)).transpose()
    }

    #[tracing::instrument(skip(self, outcome), fields(winner = %outcome.winner))]
    async fn record_draw(&self, outcome: &DrawOutcome) -> Result<DrawOutcome> {
        sqlx::query(r"INSERT INTO draw_outcome (id, winner_id, drawn_at) VALUES ($1, $2, $3)")
            .bind(outcome.id.as_uuid())
            .bind(outcome.winner.as_uuid())
            .bind(outcome.drawn_at)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if unique_constraint(&error).is_some() {
                    RaffleError::AlreadyDrawn
                } else if is_foreign_key_violation(&error) {
                    RaffleError::StoreUnavailable("selected winner no longer exists".to_string())
                } else {
                    db_error("record draw", &error)
                }
            })?;

        Ok(outcome.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn reset(&self) -> Result<()> {
        // One statement wipes the cycle; the FK makes the order matter.
        sqlx::query(r"TRUNCATE draw_outcome, extra_requests, participants")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("reset cycle", &e))?;
        Ok(())
    }
}

// ============================================================================
// Error mapping and row decoding
// ============================================================================

fn db_error(context: &str, error: &sqlx::Error) -> RaffleError {
    RaffleError::StoreUnavailable(format!("{context}: {error}"))
}

fn corrupt(what: &str) -> RaffleError {
    RaffleError::StoreUnavailable(format!("corrupt row: {what}"))
}

/// The violated unique constraint name, if this is a unique violation.
fn unique_constraint(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            db.constraint().map(str::to_owned)
        }
        _ => None,
    }
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn number_to_db(number: TicketNumber) -> Result<i32> {
    i32::try_from(number.get())
        .map_err(|_| corrupt("ticket number exceeds storage range"))
}

fn number_from_db(value: i32) -> Result<TicketNumber> {
    u32::try_from(value)
        .ok()
        .and_then(TicketNumber::new)
        .ok_or_else(|| corrupt("ticket number out of range"))
}

fn numbers_to_db(numbers: &[TicketNumber]) -> Result<Vec<i32>> {
    numbers.iter().copied().map(number_to_db).collect()
}

fn amount_to_db(amount: Money) -> Result<i64> {
    i64::try_from(amount.cents()).map_err(|_| corrupt("amount exceeds storage range"))
}

fn count_to_db(count: u32) -> Result<i32> {
    i32::try_from(count).map_err(|_| corrupt("extra count exceeds storage range"))
}

fn participant_from_row(row: &PgRow) -> Result<Participant> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| db_error("decode participant id", &e))?;
    let name: String = row
        .try_get("full_name")
        .map_err(|e| db_error("decode participant name", &e))?;
    let contact: String = row
        .try_get("contact")
        .map_err(|e| db_error("decode participant contact", &e))?;
    let number: i32 = row
        .try_get("ticket_number")
        .map_err(|e| db_error("decode ticket number", &e))?;
    let origin: String = row
        .try_get("origin")
        .map_err(|e| db_error("decode origin", &e))?;
    let registered_at: DateTime<Utc> = row
        .try_get("registered_at")
        .map_err(|e| db_error("decode registered_at", &e))?;

    Ok(Participant::new(
        ParticipantId::from_uuid(id),
        FullName::parse(&name).map_err(|_| corrupt("full name"))?,
        PhoneNumber::parse(&contact).map_err(|_| corrupt("contact"))?,
        number_from_db(number)?,
        TicketOrigin::parse(&origin).ok_or_else(|| corrupt("origin"))?,
        registered_at,
    ))
}

fn request_from_row(row: &PgRow) -> Result<ExtraNumberRequest> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| db_error("decode request id", &e))?;
    let name: String = row
        .try_get("requester_name")
        .map_err(|e| db_error("decode requester name", &e))?;
    let contact: String = row
        .try_get("contact")
        .map_err(|e| db_error("decode request contact", &e))?;
    let amount: i64 = row
        .try_get("amount_cents")
        .map_err(|e| db_error("decode amount", &e))?;
    let extra_count: i32 = row
        .try_get("extra_count")
        .map_err(|e| db_error("decode extra count", &e))?;
    let proof: String = row
        .try_get("proof_uri")
        .map_err(|e| db_error("decode proof uri", &e))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| db_error("decode status", &e))?;
    let granted: Vec<i32> = row
        .try_get("granted_numbers")
        .map_err(|e| db_error("decode granted numbers", &e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| db_error("decode created_at", &e))?;
    let decided_at: Option<DateTime<Utc>> = row
        .try_get("decided_at")
        .map_err(|e| db_error("decode decided_at", &e))?;

    let mut request = ExtraNumberRequest::new(
        RequestId::from_uuid(id),
        FullName::parse(&name).map_err(|_| corrupt("requester name"))?,
        PhoneNumber::parse(&contact).map_err(|_| corrupt("request contact"))?,
        Money::from_cents(u64::try_from(amount).map_err(|_| corrupt("negative amount"))?),
        u32::try_from(extra_count).map_err(|_| corrupt("negative extra count"))?,
        ProofUri::new(proof),
        created_at,
    );
    request.status = RequestStatus::parse(&status).ok_or_else(|| corrupt("status"))?;
    request.granted_numbers = granted
        .into_iter()
        .map(number_from_db)
        .collect::<Result<_>>()?;
    request.decided_at = decided_at;
    Ok(request)
}

fn outcome_from_row(row: &PgRow) -> Result<DrawOutcome> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| db_error("decode outcome id", &e))?;
    let winner: Uuid = row
        .try_get("winner_id")
        .map_err(|e| db_error("decode winner id", &e))?;
    let drawn_at: DateTime<Utc> = row
        .try_get("drawn_at")
        .map_err(|e| db_error("decode drawn_at", &e))?;

    Ok(DrawOutcome::new(
        DrawId::from_uuid(id),
        ParticipantId::from_uuid(winner),
        drawn_at,
    ))
}
