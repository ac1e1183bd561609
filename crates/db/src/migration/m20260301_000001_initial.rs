//! Initial database migration.
//!
//! Creates the enums, school registry tables, fee structures, payments and
//! the append-only audit log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: SCHOOL REGISTRY
        // ============================================================
        db.execute_unprepared(GRADES_SQL).await?;
        db.execute_unprepared(PUPILS_SQL).await?;
        db.execute_unprepared(PARENTS_SQL).await?;

        // ============================================================
        // PART 3: BILLING
        // ============================================================
        db.execute_unprepared(FEE_STRUCTURES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 4: AUDIT LOG
        // ============================================================
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE pupil_status AS ENUM (
    'active',
    'inactive',
    'graduated',
    'withdrawn'
);

CREATE TYPE payment_state AS ENUM (
    'active',
    'pending_deletion',
    'deletion_approved',
    'deletion_rejected'
);

CREATE TYPE audit_action AS ENUM (
    'CREATE',
    'UPDATE',
    'SOFT_DELETE',
    'APPROVE_DELETION',
    'REJECT_DELETION',
    'ACTIVATE',
    'DEACTIVATE',
    'DELETE'
);
";

const GRADES_SQL: &str = r"
CREATE TABLE grades (
    id              UUID PRIMARY KEY,
    name            VARCHAR(120) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT grades_name_not_blank CHECK (LENGTH(TRIM(name)) > 0)
);

CREATE UNIQUE INDEX idx_grades_name_unique ON grades (LOWER(name));
";

const PUPILS_SQL: &str = r"
CREATE TABLE pupils (
    id              UUID PRIMARY KEY,
    full_name       VARCHAR(120) NOT NULL,
    grade_id        UUID NOT NULL REFERENCES grades(id) ON DELETE RESTRICT,
    status          pupil_status NOT NULL DEFAULT 'active',
    enrolled_at     DATE NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_pupils_grade ON pupils (grade_id);
";

const PARENTS_SQL: &str = r"
CREATE TABLE parents (
    id              UUID PRIMARY KEY,
    full_name       VARCHAR(120) NOT NULL,
    phone           VARCHAR(40),
    email           VARCHAR(255),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE pupil_parents (
    pupil_id        UUID NOT NULL REFERENCES pupils(id) ON DELETE CASCADE,
    parent_id       UUID NOT NULL REFERENCES parents(id) ON DELETE CASCADE,
    relationship    VARCHAR(40),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    PRIMARY KEY (pupil_id, parent_id)
);

CREATE INDEX idx_pupil_parents_parent ON pupil_parents (parent_id);
";

const FEE_STRUCTURES_SQL: &str = r"
CREATE TABLE fee_structures (
    id              UUID PRIMARY KEY,
    grade_id        UUID NOT NULL REFERENCES grades(id) ON DELETE RESTRICT,
    term_number     SMALLINT NOT NULL,
    year            INTEGER NOT NULL,
    amount          NUMERIC(14, 2) NOT NULL,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_by      UUID NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT fee_structures_term_range CHECK (term_number BETWEEN 1 AND 3),
    CONSTRAINT fee_structures_amount_non_negative CHECK (amount >= 0)
);

-- At most one active structure per (grade, term, year)
CREATE UNIQUE INDEX idx_fee_structures_active_key
    ON fee_structures (grade_id, term_number, year)
    WHERE is_active;

CREATE INDEX idx_fee_structures_key ON fee_structures (grade_id, term_number, year);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id                      UUID PRIMARY KEY,
    pupil_id                UUID NOT NULL REFERENCES pupils(id) ON DELETE RESTRICT,
    term_number             SMALLINT NOT NULL,
    year                    INTEGER NOT NULL,
    amount                  NUMERIC(14, 2) NOT NULL,
    reference               VARCHAR(64),
    recorded_at             TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    recorded_by             UUID NOT NULL,
    state                   payment_state NOT NULL DEFAULT 'active',
    deletion_reason         TEXT,
    deletion_requested_by   UUID,
    deletion_requested_at   TIMESTAMPTZ,
    deletion_reviewed_by    UUID,
    deletion_reviewed_at    TIMESTAMPTZ,
    rejection_reason        TEXT,
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT payments_term_range CHECK (term_number BETWEEN 1 AND 3),
    CONSTRAINT payments_amount_positive CHECK (amount > 0),
    CONSTRAINT payments_pending_has_request CHECK (
        state NOT IN ('pending_deletion', 'deletion_approved', 'deletion_rejected')
        OR (deletion_requested_by IS NOT NULL AND deletion_reason IS NOT NULL)
    )
);

CREATE INDEX idx_payments_pupil_term ON payments (pupil_id, term_number, year);
CREATE INDEX idx_payments_term ON payments (term_number, year);
CREATE INDEX idx_payments_pending ON payments (deletion_requested_at)
    WHERE state = 'pending_deletion';
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id                  UUID PRIMARY KEY,
    action_type         audit_action NOT NULL,
    table_name          VARCHAR(64) NOT NULL,
    record_id           UUID NOT NULL,
    actor_id            UUID NOT NULL,
    before_snapshot     JSONB,
    after_snapshot      JSONB,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_logs_record ON audit_logs (table_name, record_id, created_at);
CREATE INDEX idx_audit_logs_actor ON audit_logs (actor_id, created_at);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_audit_log_modification
-- The audit log is append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_audit_log_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'audit_logs is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_audit_logs_append_only
BEFORE UPDATE OR DELETE ON audit_logs
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_log_modification();

-- ============================================================
-- FUNCTION: prevent_payment_removal
-- Payments are never physically deleted
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_payment_removal()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'payments cannot be deleted; use the deletion workflow';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_payments_no_delete
BEFORE DELETE ON payments
FOR EACH ROW
EXECUTE FUNCTION prevent_payment_removal();

-- ============================================================
-- FUNCTION: guard_payment_update
-- Financial fields are immutable and DeletionApproved is terminal
-- ============================================================
CREATE OR REPLACE FUNCTION guard_payment_update()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.amount <> OLD.amount
        OR NEW.pupil_id <> OLD.pupil_id
        OR NEW.term_number <> OLD.term_number
        OR NEW.year <> OLD.year
        OR NEW.recorded_by <> OLD.recorded_by THEN
        RAISE EXCEPTION 'payment % financial fields are immutable', OLD.id;
    END IF;

    IF OLD.state = 'deletion_approved' THEN
        RAISE EXCEPTION 'payment % deletion is already approved', OLD.id;
    END IF;

    NEW.updated_at := NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_payments_guard_update
BEFORE UPDATE ON payments
FOR EACH ROW
EXECUTE FUNCTION guard_payment_update();
";

const DROP_ALL_SQL: &str = r"
-- Drop triggers
DROP TRIGGER IF EXISTS trg_payments_guard_update ON payments;
DROP TRIGGER IF EXISTS trg_payments_no_delete ON payments;
DROP TRIGGER IF EXISTS trg_audit_logs_append_only ON audit_logs;

-- Drop functions
DROP FUNCTION IF EXISTS guard_payment_update();
DROP FUNCTION IF EXISTS prevent_payment_removal();
DROP FUNCTION IF EXISTS prevent_audit_log_modification();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS audit_logs CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS fee_structures CASCADE;
DROP TABLE IF EXISTS pupil_parents CASCADE;
DROP TABLE IF EXISTS parents CASCADE;
DROP TABLE IF EXISTS pupils CASCADE;
DROP TABLE IF EXISTS grades CASCADE;

-- Drop enums
DROP TYPE IF EXISTS audit_action;
DROP TYPE IF EXISTS payment_state;
DROP TYPE IF EXISTS pupil_status;
";
