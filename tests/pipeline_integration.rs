//! Pipeline behavior against in-process fakes: no-match policy, prompt
//! composition, failure propagation, and ingest-then-retrieve.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{
    test_config, FakeEmbedder, InMemoryIndex, RecordingGenerator, UnreachableEmbedder,
    UnreachableIndex, WrongDimEmbedder,
};
use ragserve::clients::VectorIndex;
use ragserve::pipeline::{PipelineError, RagPipeline, NO_MATCH_RESPONSE};

fn pipeline_with(
    embedder: Arc<dyn ragserve::clients::Embedder>,
    generator: Arc<RecordingGenerator>,
    index: Arc<dyn VectorIndex>,
) -> RagPipeline {
    RagPipeline::new(&test_config(), embedder, generator, index)
}

#[tokio::test]
async fn empty_index_yields_canned_response() {
    let generator = Arc::new(RecordingGenerator::new("should not be called"));
    let pipeline = pipeline_with(
        Arc::new(FakeEmbedder::new()),
        generator.clone(),
        Arc::new(InMemoryIndex::new()),
    );

    let answer = pipeline.answer("Who created Python?").await.unwrap();

    assert_eq!(answer.response, NO_MATCH_RESPONSE);
    assert_eq!(answer.context, "");
    // The generation model is never consulted on the no-match path.
    assert!(generator.recorded_prompts().is_empty());
}

#[tokio::test]
async fn hit_context_flows_into_prompt_and_response() {
    let passage = "Python was created by Guido van Rossum.";
    let generator = Arc::new(RecordingGenerator::new("Guido van Rossum created it."));
    let index = Arc::new(InMemoryIndex::new());
    let pipeline = pipeline_with(Arc::new(FakeEmbedder::new()), generator.clone(), index);

    pipeline.ingest(passage).await.unwrap();
    let answer = pipeline.answer("Who created Python?").await.unwrap();

    assert_eq!(answer.context, passage);
    assert!(answer.response.contains("Guido van Rossum"));

    let prompts = generator.recorded_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(passage));
    assert!(prompts[0].contains("Who created Python?"));
}

#[tokio::test]
async fn top_hit_is_the_ingested_passage_among_several() {
    let generator = Arc::new(RecordingGenerator::new("answer"));
    let index = Arc::new(InMemoryIndex::new());
    let pipeline = pipeline_with(Arc::new(FakeEmbedder::new()), generator, index);

    pipeline.ingest("The sky is blue.").await.unwrap();
    pipeline.ingest("Water boils at 100 degrees.").await.unwrap();
    pipeline.ingest("Rust has no garbage collector.").await.unwrap();

    // Identical text embeds identically, so it must dominate the ranking.
    let answer = pipeline.answer("Water boils at 100 degrees.").await.unwrap();
    assert_eq!(answer.context, "Water boils at 100 degrees.");
}

#[tokio::test]
async fn each_ingest_gets_its_own_identifier() {
    let generator = Arc::new(RecordingGenerator::new("answer"));
    let index = Arc::new(InMemoryIndex::new());
    let pipeline = pipeline_with(Arc::new(FakeEmbedder::new()), generator, index.clone());

    let a = pipeline.ingest("first passage").await.unwrap();
    let b = pipeline.ingest("second passage").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(index.point_count(), 2);
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let generator = Arc::new(RecordingGenerator::new("answer"));
    let pipeline = pipeline_with(
        Arc::new(FakeEmbedder::new()),
        generator,
        Arc::new(InMemoryIndex::new()),
    );

    assert!(matches!(
        pipeline.answer("   ").await,
        Err(PipelineError::EmptyInput)
    ));
    assert!(matches!(
        pipeline.ingest("").await,
        Err(PipelineError::EmptyInput)
    ));
}

#[tokio::test]
async fn embedder_failure_aborts_both_flows() {
    let generator = Arc::new(RecordingGenerator::new("answer"));
    let pipeline = pipeline_with(
        Arc::new(UnreachableEmbedder),
        generator.clone(),
        Arc::new(InMemoryIndex::new()),
    );

    assert!(matches!(
        pipeline.answer("question").await,
        Err(PipelineError::Model(_))
    ));
    assert!(matches!(
        pipeline.ingest("text").await,
        Err(PipelineError::Model(_))
    ));
    assert!(generator.recorded_prompts().is_empty());
}

#[tokio::test]
async fn index_failure_aborts_the_query() {
    let generator = Arc::new(RecordingGenerator::new("answer"));
    let pipeline = pipeline_with(
        Arc::new(FakeEmbedder::new()),
        generator,
        Arc::new(UnreachableIndex),
    );

    assert!(matches!(
        pipeline.answer("question").await,
        Err(PipelineError::Index(_))
    ));
}

#[tokio::test]
async fn wrong_dimensionality_never_reaches_the_index() {
    let generator = Arc::new(RecordingGenerator::new("answer"));
    let index = Arc::new(InMemoryIndex::new());
    let pipeline = pipeline_with(
        Arc::new(WrongDimEmbedder { dim: 3 }),
        generator,
        index.clone(),
    );

    let err = pipeline.ingest("text").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::DimensionMismatch {
            expected: common::TEST_DIM,
            actual: 3
        }
    ));
    assert_eq!(index.point_count(), 0);
}

#[tokio::test]
async fn ensure_collection_is_create_if_absent() {
    let index = InMemoryIndex::new();
    let schema = test_config().qdrant.schema();

    index.ensure_collection(&schema).await.unwrap();
    index
        .upsert(ragserve::clients::PassagePoint {
            id: uuid::Uuid::new_v4(),
            vector: vec![0.0; common::TEST_DIM],
            text: "kept".to_string(),
        })
        .await
        .unwrap();

    // Second call must not error, must not re-create, must not drop points.
    index.ensure_collection(&schema).await.unwrap();
    assert_eq!(index.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(index.point_count(), 1);
}
