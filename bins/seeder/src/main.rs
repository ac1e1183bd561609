//! Database seeder for Feeledger development and testing.
//!
//! Seeds a few grades, their term fees, pupils and first-term payments so
//! balances and reports have something to show. Safe to re-run: existing
//! grades are reused and pupils are only enrolled into empty grades.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use feeledger_core::access::{ActorContext, ActorRole};
use feeledger_core::calendar::YearRange;
use feeledger_core::payment::{LedgerPolicy, NewPayment, PaymentLedger};
use feeledger_core::school::{Grade, NewPupil, SchoolError};
use feeledger_db::{
    FeeStructureRepository, GradeRepository, PaymentRepository, PupilRepository, StoreSettings,
};
use feeledger_shared::AppConfig;
use feeledger_shared::types::{TermNumber, UserId};

/// Academic year the seed data is written for.
const SEED_YEAR: i32 = 2024;

/// Grade name, fee per term, pupil names.
const GRADES: [(&str, i64, [&str; 3]); 3] = [
    ("Grade 1", 500, ["Amina Njeri", "Brian Otieno", "Chloe Wanjiku"]),
    ("Grade 2", 550, ["David Kamau", "Esther Achieng", "Felix Mutua"]),
    ("Grade 3", 600, ["Grace Atieno", "Hassan Ali", "Irene Chebet"]),
];

struct Seeder {
    grades: GradeRepository,
    pupils: PupilRepository,
    fees: FeeStructureRepository,
    payments: PaymentRepository,
    bursar: ActorContext,
    clerk: ActorContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feeledger=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = feeledger_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let settings = StoreSettings::from_config(&config.database);
    let seeder = Seeder {
        grades: GradeRepository::new(db.clone(), settings),
        pupils: PupilRepository::new(db.clone(), settings),
        fees: FeeStructureRepository::new(db.clone(), settings, YearRange::from(&config.ledger)),
        payments: PaymentRepository::new(
            db,
            settings,
            PaymentLedger::new(LedgerPolicy::from(&config.ledger)),
        ),
        bursar: ActorContext::new(UserId::new(), ActorRole::Bursar),
        clerk: ActorContext::new(UserId::new(), ActorRole::Clerk),
    };

    for (name, fee, pupils) in GRADES {
        println!("Seeding {name}...");
        let grade = seeder.grade(name).await?;
        seeder.fees(&grade, Decimal::from(fee)).await?;
        seeder.pupils(&grade, &pupils, Decimal::from(fee)).await?;
    }

    println!("Seeding complete!");
    Ok(())
}

impl Seeder {
    async fn grade(&self, name: &str) -> anyhow::Result<Grade> {
        match self.grades.create_grade(name, &self.bursar).await {
            Ok(grade) => Ok(grade),
            Err(SchoolError::DuplicateGradeName(_)) => {
                println!("  {name} already exists, reusing it");
                self.grades
                    .list_grades(&self.bursar)
                    .await?
                    .into_iter()
                    .find(|g| g.name == name)
                    .with_context(|| format!("{name} vanished while seeding"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn fees(&self, grade: &Grade, amount: Decimal) -> anyhow::Result<()> {
        for term in TermNumber::ALL {
            let upsert = self
                .fees
                .upsert_fee_structure(grade.id, term, SEED_YEAR, amount, &self.bursar)
                .await?;
            if upsert.changed {
                println!("  Term {} fee set to {amount}", term.get());
            }
        }
        Ok(())
    }

    /// Enrols pupils into an empty grade and records a spread of
    /// first-term payments: paid in full, part-paid and unpaid.
    async fn pupils(&self, grade: &Grade, names: &[&str], fee: Decimal) -> anyhow::Result<()> {
        if !self.pupils.list_by_grade(grade.id, &self.clerk).await?.is_empty() {
            println!("  Pupils already enrolled, skipping");
            return Ok(());
        }

        let enrolled_at = NaiveDate::from_ymd_opt(SEED_YEAR, 1, 8).context("invalid seed date")?;
        let paid = [fee, fee / Decimal::TWO, Decimal::ZERO];

        for (name, amount) in names.iter().zip(paid) {
            let pupil = self
                .pupils
                .create_pupil(
                    NewPupil {
                        full_name: (*name).to_string(),
                        grade_id: grade.id,
                        enrolled_at,
                    },
                    &self.clerk,
                )
                .await?;

            if amount > Decimal::ZERO {
                self.payments
                    .record_payment(
                        NewPayment {
                            pupil_id: pupil.id,
                            term: TermNumber::FIRST,
                            year: SEED_YEAR,
                            amount,
                            reference: Some(format!("SEED-{}", pupil.id)),
                        },
                        &self.clerk,
                    )
                    .await?;
            }
            println!("  Enrolled {name}, paid {amount}");
        }
        Ok(())
    }
}
