use crate::infra::InMemoryEvaluationRepository;
use chrono::{Duration as DateSpan, Local};
use clap::Args;
use coach_eval::config::EvaluationSettings;
use coach_eval::error::AppError;
use coach_eval::workflows::evaluations::{
    Autosaver, CoachRef, CompetencyCatalog, DraftSaver, EmployeeRef, Evaluation,
    EvaluationService, EvaluationServiceError, LifecycleError, Rating, SaveOutcome, SectionKind,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Leave this competency unrated to see finalization refused.
    #[arg(long)]
    pub(crate) miss: Option<String>,
    /// Autosave period for the demo session, in milliseconds.
    #[arg(long, default_value_t = 250)]
    pub(crate) autosave_ms: u64,
}

/// Deterministic spread of ratings so the score card has strengths and gaps.
fn sample_rating(position: usize) -> Rating {
    match position % 9 {
        4 => Rating::InDevelopment,
        7 => Rating::ToDevelop,
        _ => Rating::Evident,
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { miss, autosave_ms } = args;
    let catalog = CompetencyCatalog::reference();

    if let Some(name) = miss.as_deref() {
        let known = SectionKind::ordered()
            .into_iter()
            .any(|section| catalog.contains(section, name));
        if !known {
            println!("Note: '{name}' is not in the competency catalog; every item will be rated.");
        }
    }

    let settings = EvaluationSettings {
        autosave_interval: Duration::from_millis(autosave_ms.max(1)),
        ..EvaluationSettings::default()
    };
    let service = Arc::new(EvaluationService::new(
        Arc::new(InMemoryEvaluationRepository::default()),
        catalog.clone(),
        settings,
    ));
    let context = service.context_for(CoachRef {
        id: "coach-demo".to_string(),
        name: "Coach de demostración".to_string(),
    });
    let today = Local::now().date_naive();

    println!("Coaching evaluation demo");
    let draft = service.start(
        &context,
        EmployeeRef {
            id: "emp-demo".to_string(),
            name: "Colaborador de ejemplo".to_string(),
        },
        today,
    )?;
    println!(
        "  Draft {} opened for {} ({} competencies)",
        draft.id,
        draft.employee.name,
        catalog.total()
    );

    let session = service.open_for_edit(&draft.id)?;
    let saver = Arc::new(DraftSaver::new(session, service.clone()));
    let period = service.settings().autosave_interval;
    let autosaver = Autosaver::spawn(saver.clone(), period);

    {
        let mut session = saver.session().lock().await;
        let mut position = 0;
        for section in SectionKind::ordered() {
            for competency in catalog.competencies(section) {
                position += 1;
                if miss.as_deref() == Some(competency.as_str()) {
                    continue;
                }
                session.rate(section, competency, sample_rating(position))?;
            }
        }
        session.add_commitment("Actualizar la agenda semanal en ASANA cada lunes")?;
        session.add_commitment("Revisar reportes administrativos con el equipo")?;
        session.set_general_notes(Some("Sesión de demostración".to_string()))?;
        session.set_next_review(Some(today + DateSpan::days(30)))?;
        println!("  Rated the form (revision {})", session.revision());
    }

    tokio::time::sleep(period * 2).await;
    {
        let session = saver.session().lock().await;
        match session.last_saved_at() {
            Some(at) if !session.is_dirty() => println!("  Autosaved at {at}"),
            _ => println!("  Autosave pending"),
        }
    }
    autosaver.shutdown().await;

    match saver.save().await? {
        SaveOutcome::Saved { revision } => println!("  Saved revision {revision} manually"),
        SaveOutcome::Clean | SaveOutcome::InFlight => {}
    }

    match service.finalize(&draft.id, &context) {
        Ok(evaluation) => render_score_card(&evaluation),
        Err(EvaluationServiceError::Lifecycle(LifecycleError::IncompleteSection { sections })) => {
            println!("\nFinalization refused; unrated competencies remain in:");
            let stored = service.get(&draft.id)?;
            for section in sections {
                println!(
                    "  {}: {}",
                    section.label(),
                    stored.sections.get(section).unrated_competencies().join(", ")
                );
            }
        }
        Err(err) => return Err(err.into()),
    }

    let overview = service.overview(chrono::Utc::now())?;
    println!(
        "\nOverview: {} evaluations, {} drafts pending, {} finalized this month",
        overview.total_evaluations, overview.drafts_pending, overview.finalized_this_month
    );

    Ok(())
}

fn render_score_card(evaluation: &Evaluation) {
    println!("\nFinalized evaluation {}", evaluation.id);
    for (section, data) in evaluation.sections.iter() {
        println!("  {:<28} {:.2}", section.label(), data.average);
    }
    println!("  Overall average: {:.2}", evaluation.overall_average);
    println!("  Effectiveness: {}%", evaluation.effectiveness_percent);
    println!("  Strengths: {}", evaluation.strengths.len());
    if evaluation.opportunity_areas.is_empty() {
        println!("  Opportunity areas: none");
    } else {
        println!("  Opportunity areas:");
        for area in &evaluation.opportunity_areas {
            println!("    - {area}");
        }
    }
    if let Some(next) = evaluation.next_review {
        println!("  Next review: {next}");
    }
}
