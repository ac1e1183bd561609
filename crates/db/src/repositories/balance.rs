//! Balance and report reads.
//!
//! Every read runs in one `REPEATABLE READ READ ONLY` transaction and
//! recomputes from current rows; nothing here is cached or stored.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::debug;

use feeledger_core::access::{ActorContext, Permission};
use feeledger_core::balance::{
    BalanceQuery, PupilBalance, ReconciliationEngine, ReconciliationError,
};
use feeledger_core::calendar::{DuePolicy, YearRange};
use feeledger_core::fees::{FeeCatalog, FeeError, FeeKey, FeeStructure};
use feeledger_core::payment::Payment;
use feeledger_core::reports::{
    CollectionTrend, GradeSummary, Heatmap, ReportService, SchoolSummary,
};
use feeledger_core::school::{Grade, Pupil};
use feeledger_shared::types::{GradeId, PupilId, TermNumber};

use crate::entities::convert::try_collect;
use crate::entities::{fee_structures, grades, payments, pupils};
use crate::store::{StoreError, StoreSettings, begin_read, bounded};

/// Reconciles balances and folds them into reports.
#[derive(Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
    settings: StoreSettings,
    years: YearRange,
    due: Arc<dyn DuePolicy>,
}

impl std::fmt::Debug for BalanceRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceRepository")
            .field("settings", &self.settings)
            .field("years", &self.years)
            .finish_non_exhaustive()
    }
}

/// Rows needed to reconcile a set of pupils for one year.
struct Snapshot {
    pupils: Vec<Pupil>,
    fees: Vec<FeeStructure>,
    payments: Vec<Payment>,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        settings: StoreSettings,
        years: YearRange,
        due: Arc<dyn DuePolicy>,
    ) -> Self {
        Self {
            db,
            settings,
            years,
            due,
        }
    }

    /// Balance of one pupil for one term, against the pupil's current grade.
    pub async fn compute_pupil_balance(
        &self,
        pupil_id: PupilId,
        query: BalanceQuery,
        actor: &ActorContext,
    ) -> Result<PupilBalance, ReconciliationError> {
        self.check(query.year, actor)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let pupil: Pupil = pupils::Entity::find_by_id(pupil_id.into_inner())
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(ReconciliationError::PupilNotFound(pupil_id))?
                .into();
            let snapshot =
                load_snapshot(&txn, Some(pupil.grade_id), query.year, Some(query.term)).await?;
            txn.commit().await.map_err(StoreError::from)?;

            let key = FeeKey::new(pupil.grade_id, query.term, query.year);
            let fee = resolve(&snapshot.fees, key)?;
            let payments: Vec<Payment> = snapshot
                .payments
                .into_iter()
                .filter(|p| p.pupil_id == pupil.id)
                .collect();
            let balance = ReconciliationEngine::compute_pupil_balance(
                &pupil,
                fee,
                &payments,
                query,
                self.due.as_ref(),
            );
            debug!(pupil_id = %pupil_id, status = %balance.status, "pupil balance computed");
            Ok(balance)
        })
        .await
    }

    /// Balances of every pupil in a grade for one term.
    pub async fn list_grade_balances(
        &self,
        grade_id: GradeId,
        query: BalanceQuery,
        actor: &ActorContext,
    ) -> Result<Vec<PupilBalance>, ReconciliationError> {
        self.check(query.year, actor)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let grade = load_grade(&txn, grade_id).await?;
            let snapshot =
                load_snapshot(&txn, Some(grade.id), query.year, Some(query.term)).await?;
            txn.commit().await.map_err(StoreError::from)?;
            self.balances(&grade, &snapshot, query)
        })
        .await
    }

    /// Folds a grade's pupil balances for one term.
    pub async fn compute_grade_summary(
        &self,
        grade_id: GradeId,
        query: BalanceQuery,
        actor: &ActorContext,
    ) -> Result<GradeSummary, ReconciliationError> {
        self.check(query.year, actor)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let grade = load_grade(&txn, grade_id).await?;
            let snapshot =
                load_snapshot(&txn, Some(grade.id), query.year, Some(query.term)).await?;
            txn.commit().await.map_err(StoreError::from)?;

            let balances = self.balances(&grade, &snapshot, query)?;
            Ok(ReportService::grade_summary(
                &grade,
                query.term,
                query.year,
                &balances,
            ))
        })
        .await
    }

    /// Folds every grade's summary for one term.
    pub async fn compute_school_summary(
        &self,
        query: BalanceQuery,
        actor: &ActorContext,
    ) -> Result<SchoolSummary, ReconciliationError> {
        self.check(query.year, actor)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let grades = load_grades(&txn).await?;
            let snapshot = load_snapshot(&txn, None, query.year, Some(query.term)).await?;
            txn.commit().await.map_err(StoreError::from)?;

            let summaries = self.grade_summaries(&grades, &snapshot, query)?;
            Ok(ReportService::school_summary(query.term, query.year, summaries))
        })
        .await
    }

    /// School collection for each term of `year`.
    pub async fn collection_trend(
        &self,
        year: i32,
        today: NaiveDate,
        actor: &ActorContext,
    ) -> Result<CollectionTrend, ReconciliationError> {
        self.check(year, actor)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let grades = load_grades(&txn).await?;
            let snapshot = load_snapshot(&txn, None, year, None).await?;
            txn.commit().await.map_err(StoreError::from)?;

            let mut schools = Vec::with_capacity(TermNumber::ALL.len());
            for term in TermNumber::ALL {
                let query = BalanceQuery::new(term, year, today);
                let summaries = self.grade_summaries(&grades, &snapshot, query)?;
                schools.push(ReportService::school_summary(term, year, summaries));
            }
            Ok(ReportService::collection_trend(year, &schools))
        })
        .await
    }

    /// Grade × term collection heatmap for `year`.
    pub async fn heatmap(
        &self,
        year: i32,
        today: NaiveDate,
        actor: &ActorContext,
    ) -> Result<Heatmap, ReconciliationError> {
        self.check(year, actor)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let grades = load_grades(&txn).await?;
            let snapshot = load_snapshot(&txn, None, year, None).await?;
            txn.commit().await.map_err(StoreError::from)?;

            let mut summaries = Vec::with_capacity(grades.len() * TermNumber::ALL.len());
            for term in TermNumber::ALL {
                let query = BalanceQuery::new(term, year, today);
                summaries.extend(self.grade_summaries(&grades, &snapshot, query)?);
            }
            Ok(ReportService::heatmap(year, &summaries))
        })
        .await
    }

    fn check(&self, year: i32, actor: &ActorContext) -> Result<(), ReconciliationError> {
        actor.require(Permission::ReadLedger)?;
        if self.years.contains(year) {
            Ok(())
        } else {
            Err(ReconciliationError::YearOutOfRange {
                year,
                min: self.years.min,
                max: self.years.max,
            })
        }
    }

    fn balances(
        &self,
        grade: &Grade,
        snapshot: &Snapshot,
        query: BalanceQuery,
    ) -> Result<Vec<PupilBalance>, ReconciliationError> {
        let fee = resolve(&snapshot.fees, FeeKey::new(grade.id, query.term, query.year))?;

        let mut by_pupil: HashMap<PupilId, Vec<Payment>> = HashMap::new();
        for payment in &snapshot.payments {
            by_pupil
                .entry(payment.pupil_id)
                .or_default()
                .push(payment.clone());
        }

        Ok(snapshot
            .pupils
            .iter()
            .filter(|p| p.grade_id == grade.id)
            .map(|pupil| {
                let payments = by_pupil.get(&pupil.id).map_or(&[][..], Vec::as_slice);
                ReconciliationEngine::compute_pupil_balance(
                    pupil,
                    fee,
                    payments,
                    query,
                    self.due.as_ref(),
                )
            })
            .collect())
    }

    fn grade_summaries(
        &self,
        grades: &[Grade],
        snapshot: &Snapshot,
        query: BalanceQuery,
    ) -> Result<Vec<GradeSummary>, ReconciliationError> {
        grades
            .iter()
            .map(|grade| {
                let balances = self.balances(grade, snapshot, query)?;
                Ok(ReportService::grade_summary(
                    grade,
                    query.term,
                    query.year,
                    &balances,
                ))
            })
            .collect()
    }
}

/// Resolves the active fee, treating "none configured" as `None`.
fn resolve(fees: &[FeeStructure], key: FeeKey) -> Result<Option<&FeeStructure>, FeeError> {
    match FeeCatalog::resolve(fees, key) {
        Ok(fee) => Ok(Some(fee)),
        Err(FeeError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn load_grade(
    txn: &DatabaseTransaction,
    grade_id: GradeId,
) -> Result<Grade, ReconciliationError> {
    let row = grades::Entity::find_by_id(grade_id.into_inner())
        .one(txn)
        .await
        .map_err(StoreError::from)?
        .ok_or(ReconciliationError::GradeNotFound(grade_id))?;
    Ok(row.into())
}

async fn load_grades(txn: &DatabaseTransaction) -> Result<Vec<Grade>, StoreError> {
    let rows = grades::Entity::find()
        .order_by_asc(grades::Column::Name)
        .all(txn)
        .await?;
    Ok(rows.into_iter().map(Grade::from).collect())
}

/// Loads pupils, active fee structures and payments for a year, optionally
/// narrowed to one grade and one term.
async fn load_snapshot(
    txn: &DatabaseTransaction,
    grade_id: Option<GradeId>,
    year: i32,
    term: Option<TermNumber>,
) -> Result<Snapshot, StoreError> {
    let mut pupil_query = pupils::Entity::find().order_by_asc(pupils::Column::FullName);
    let mut fee_query = fee_structures::Entity::find()
        .filter(fee_structures::Column::Year.eq(year))
        .filter(fee_structures::Column::IsActive.eq(true));
    let mut payment_query = payments::Entity::find().filter(payments::Column::Year.eq(year));

    if let Some(grade_id) = grade_id {
        pupil_query = pupil_query.filter(pupils::Column::GradeId.eq(grade_id.into_inner()));
        fee_query = fee_query.filter(fee_structures::Column::GradeId.eq(grade_id.into_inner()));
    }
    if let Some(term) = term {
        fee_query = fee_query.filter(fee_structures::Column::TermNumber.eq(term.as_i16()));
        payment_query = payment_query.filter(payments::Column::TermNumber.eq(term.as_i16()));
    }

    let pupils: Vec<Pupil> = pupil_query
        .all(txn)
        .await?
        .into_iter()
        .map(Pupil::from)
        .collect();
    if grade_id.is_some() {
        let ids: Vec<_> = pupils.iter().map(|p| p.id.into_inner()).collect();
        payment_query = payment_query.filter(payments::Column::PupilId.is_in(ids));
    }

    Ok(Snapshot {
        pupils,
        fees: try_collect(fee_query.all(txn).await?)?,
        payments: try_collect(payment_query.all(txn).await?)?,
    })
}
