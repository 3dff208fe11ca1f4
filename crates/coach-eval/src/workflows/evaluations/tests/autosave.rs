use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use crate::workflows::evaluations::{
    Autosaver, DraftSaver, EvaluationId, EvaluationRepository, EvaluationService, Rating,
    SaveOutcome, SectionKind,
};

fn saver_with(repository: Arc<FlakyRepository>) -> (Arc<DraftSaver<FlakyRepository>>, EvaluationId) {
    let service = Arc::new(EvaluationService::new(repository, catalog(), settings()));
    let draft = service
        .start(&context(), employee(), evaluation_date())
        .unwrap();
    let session = service.open_for_edit(&draft.id).unwrap();
    (Arc::new(DraftSaver::new(session, service)), draft.id)
}

async fn edit(saver: &DraftSaver<FlakyRepository>, rating: Rating) {
    let competency = first_competency(SectionKind::NonNegotiables);
    saver
        .session()
        .lock()
        .await
        .rate(SectionKind::NonNegotiables, &competency, rating)
        .unwrap();
}

#[tokio::test]
async fn manual_save_persists_dirty_session() {
    let repository = Arc::new(FlakyRepository::default());
    let (saver, id) = saver_with(repository.clone());

    assert_eq!(saver.save().await.unwrap(), SaveOutcome::Clean);

    edit(&saver, Rating::ToDevelop).await;
    assert_eq!(saver.save().await.unwrap(), SaveOutcome::Saved { revision: 1 });

    let stored = repository.inner.stored(&id).unwrap();
    assert_eq!(stored.sections.non_negotiables.items[0].rating, Rating::ToDevelop);
    assert_eq!(stored.opportunity_areas.len(), 1);
    assert!(!saver.session().lock().await.is_dirty());
}

#[tokio::test]
async fn save_is_skipped_while_another_is_in_flight() {
    let repository = Arc::new(FlakyRepository::default());
    let (saver, _) = saver_with(repository.clone());
    edit(&saver, Rating::Evident).await;

    let guard = saver.try_begin().expect("gate is free");
    assert_eq!(saver.save().await.unwrap(), SaveOutcome::InFlight);
    drop(guard);

    assert_eq!(saver.save().await.unwrap(), SaveOutcome::Saved { revision: 1 });
    assert_eq!(repository.inner.update_count(), 1);
}

#[tokio::test]
async fn failed_save_keeps_the_session_dirty() {
    let repository = Arc::new(FlakyRepository::default());
    let (saver, _) = saver_with(repository.clone());
    edit(&saver, Rating::Evident).await;
    repository.set_failing(true);

    assert!(saver.save().await.is_err());
    assert!(saver.session().lock().await.is_dirty());

    repository.set_failing(false);
    assert_eq!(saver.save().await.unwrap(), SaveOutcome::Saved { revision: 1 });
}

#[tokio::test(start_paused = true)]
async fn autosaver_saves_on_each_tick_and_retries_failures() {
    let repository = Arc::new(FlakyRepository::default());
    let (saver, id) = saver_with(repository.clone());
    let autosaver = Autosaver::spawn(saver.clone(), Duration::from_secs(30));

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(repository.inner.update_count(), 0, "clean sessions are not written");

    edit(&saver, Rating::NoEvidence).await;
    repository.set_failing(true);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(repository.inner.update_count(), 0);
    assert!(saver.session().lock().await.is_dirty());

    repository.set_failing(false);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(repository.inner.update_count(), 1);
    assert_eq!(
        repository.inner.stored(&id).unwrap().effectiveness_percent,
        25
    );

    autosaver.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn cancelled_autosaver_stops_writing() {
    let repository = Arc::new(FlakyRepository::default());
    let (saver, _) = saver_with(repository.clone());
    let autosaver = Autosaver::spawn(saver.clone(), Duration::from_secs(30));
    let token = autosaver.token();

    autosaver.shutdown().await;
    assert!(token.is_cancelled());

    edit(&saver, Rating::Evident).await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(repository.inner.update_count(), 0);
    assert!(saver.session().lock().await.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn autosaver_stops_once_the_evaluation_is_finalized_elsewhere() {
    let repository = Arc::new(FlakyRepository::default());
    let (saver, id) = saver_with(repository.clone());
    let autosaver = Autosaver::spawn(saver.clone(), Duration::from_secs(30));
    let token = autosaver.token();

    let mut finalized = repository.inner.stored(&id).unwrap();
    rate_all(&mut finalized, Rating::Evident);
    finalized.set_next_review(Some(next_review())).unwrap();
    finalized.finalize(&coach(), at(12, 10)).unwrap();
    repository.inner.update(finalized).unwrap();

    edit(&saver, Rating::ToDevelop).await;
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert!(token.is_cancelled());
    assert_eq!(repository.inner.update_count(), 1);
    assert!(repository.inner.stored(&id).unwrap().is_finalized());

    autosaver.shutdown().await;
}
