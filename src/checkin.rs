use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{
    check_in_stats, delete_check_ins_for_owner, get_check_ins_for_owner, insert_check_in,
    CheckInRecord, CheckInStats, DbPool, NewCheckIn,
};
use crate::scoring::{is_intelligible, AnalyzeError, Analyzer, CheckInAnalysis, Filter};
use crate::settings::settings;
use crate::transcribe::HttpTranscriber;
use crate::utils::{log_check_in_error, log_check_in_rejected, log_check_in_saved};

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedCheckIn {
    pub record_id: i32,
    pub created_at: DateTime<Utc>,
    pub text_preview: String,
    pub analysis: CheckInAnalysis,
}

/// Analyzes check-ins and stores them. Nothing is written unless analysis succeeded.
#[derive(Clone)]
pub struct CheckInService {
    pool: DbPool,
    analyzer: Analyzer,
    transcriber: Option<HttpTranscriber>,
}

impl CheckInService {
    pub fn new(pool: DbPool, analyzer: Analyzer, transcriber: Option<HttpTranscriber>) -> Self {
        Self {
            pool,
            analyzer,
            transcriber,
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Blocking: runs the models and writes to the database.
    pub fn submit(&self, owner: &str, text: &str) -> Result<SubmittedCheckIn, AnalyzeError> {
        let result = self.analyze_and_store(owner, text);
        match &result {
            Ok(submitted) => log_check_in_saved(
                owner,
                submitted.record_id,
                submitted.analysis.mood.score,
                submitted.analysis.stress.score,
            ),
            Err(AnalyzeError::Rejected(filter)) => log_check_in_rejected(owner, filter),
            Err(AnalyzeError::Internal(e)) => log_check_in_error(owner, &format!("{e:#}")),
        }
        result
    }

    fn analyze_and_store(&self, owner: &str, text: &str) -> Result<SubmittedCheckIn, AnalyzeError> {
        let analysis = self.analyzer.analyze(text)?;
        let text = text.trim();
        let created_at = Utc::now();

        let new = NewCheckIn::new(
            owner,
            created_at,
            analysis.mood.score,
            analysis.stress.score,
            text,
            &analysis.recommendations,
        )?;

        let mut conn = self.pool.get().context("Failed to get connection")?;
        let row = insert_check_in(&mut conn, &new).context("Failed to save check-in")?;

        Ok(SubmittedCheckIn {
            record_id: row.id,
            created_at,
            text_preview: text_preview(text, settings().analysis.preview_length),
            analysis,
        })
    }

    /// Runs [`submit`](Self::submit) on the blocking thread pool.
    pub async fn submit_async(
        &self,
        owner: String,
        text: String,
    ) -> Result<SubmittedCheckIn, AnalyzeError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.submit(&owner, &text))
            .await
            .map_err(|e| AnalyzeError::Internal(anyhow!("Analysis task failed: {e}")))?
    }

    /// Transcribes audio and submits the transcript. A failed or empty
    /// transcription is reported as unintelligible input.
    pub async fn submit_audio(
        &self,
        owner: String,
        audio: Vec<u8>,
        content_type: &str,
    ) -> Result<SubmittedCheckIn, AnalyzeError> {
        let transcript = self.transcribe(audio, content_type).await;
        let text = match transcript {
            Ok(text) => text,
            Err(e) => {
                if let AnalyzeError::Rejected(filter) = &e {
                    log_check_in_rejected(&owner, filter);
                }
                return Err(e);
            }
        };
        self.submit_async(owner, text).await
    }

    pub async fn transcribe(&self, audio: Vec<u8>, content_type: &str) -> Result<String, AnalyzeError> {
        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or_else(|| anyhow!("Audio transcription is not configured"))?;

        if audio.is_empty() {
            return Err(AnalyzeError::Rejected(Filter::Unintelligible));
        }

        match transcriber.transcribe(audio, content_type).await {
            Ok(text) if is_intelligible(&text) => Ok(text),
            Ok(_) => Err(AnalyzeError::Rejected(Filter::Unintelligible)),
            Err(e) => {
                log_check_in_error("transcription", &format!("{e:#}"));
                Err(AnalyzeError::Rejected(Filter::Unintelligible))
            }
        }
    }

    pub fn history(&self, owner: &str) -> anyhow::Result<Vec<CheckInRecord>> {
        let mut conn = self.pool.get().context("Failed to get connection")?;
        let rows = get_check_ins_for_owner(&mut conn, owner, settings().analysis.history_limit)?;
        rows.into_iter().map(CheckInRecord::try_from).collect()
    }

    pub fn stats(&self, owner: Option<&str>) -> anyhow::Result<CheckInStats> {
        let mut conn = self.pool.get().context("Failed to get connection")?;
        Ok(check_in_stats(&mut conn, owner)?)
    }

    pub fn forget(&self, owner: &str) -> anyhow::Result<usize> {
        let mut conn = self.pool.get().context("Failed to get connection")?;
        Ok(delete_check_ins_for_owner(&mut conn, owner)?)
    }
}

/// First `max_chars` characters, with `...` appended when anything was cut.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_pool, run_migrations};
    use crate::scoring::{Emotion, EmotionCapability, EmotionDistribution, EmotionOracle, NeutralSentiment};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn service_with(analyzer: Analyzer, transcriber: Option<HttpTranscriber>) -> (TempDir, CheckInService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkins.db");
        let pool = establish_pool(path.to_str().unwrap(), 2).unwrap();
        run_migrations(&mut pool.get().unwrap()).unwrap();
        (dir, CheckInService::new(pool, analyzer, transcriber))
    }

    fn service() -> (TempDir, CheckInService) {
        service_with(Analyzer::offline(), None)
    }

    struct SadOracle;

    impl EmotionOracle for SadOracle {
        fn classify(&self, _: &str) -> anyhow::Result<EmotionDistribution> {
            Ok(EmotionDistribution::from_pairs(&[(Emotion::Sadness, 80.0)]))
        }
    }

    #[test]
    fn test_text_preview() {
        assert_eq!(text_preview("short", 100), "short");
        assert_eq!(text_preview(&"a".repeat(100), 100), "a".repeat(100));
        assert_eq!(text_preview(&"a".repeat(101), 100), format!("{}...", "a".repeat(100)));
        assert_eq!(text_preview("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_submit_persists_record() {
        let (_dir, service) = service();
        let submitted = service
            .submit("alice", "  Had a calm and pleasant evening with friends  ")
            .unwrap();

        let history = service.history("alice").unwrap();
        assert_eq!(history.len(), 1);
        let record = &history[0];
        assert_eq!(record.id, submitted.record_id);
        assert_eq!(record.full_text, "Had a calm and pleasant evening with friends");
        assert_eq!(record.mood_score, i32::from(submitted.analysis.mood.score));
        assert_eq!(record.stress_score, i32::from(submitted.analysis.stress.score));
        assert_eq!(record.recommendations, submitted.analysis.recommendations);
        assert_eq!(
            record.created_at.timestamp_millis(),
            submitted.created_at.timestamp_millis()
        );
    }

    #[test]
    fn test_rejected_text_is_not_stored() {
        let (_dir, service) = service();
        let err = service.submit("alice", "ok").unwrap_err();
        assert!(matches!(err, AnalyzeError::Rejected(Filter::MinLength)));
        assert_eq!(service.stats(Some("alice")).unwrap().count, 0);
    }

    #[test]
    fn test_history_and_stats_per_owner() {
        let analyzer = Analyzer::new(
            EmotionCapability::Available(Arc::new(SadOracle)),
            Arc::new(NeutralSentiment),
        );
        let (_dir, service) = service_with(analyzer, None);

        service.submit("alice", "Another long day at the office").unwrap();
        service.submit("alice", "Feeling a bit better this morning").unwrap();
        service.submit("bob", "Quiet weekend, nothing much to report").unwrap();

        assert_eq!(service.history("alice").unwrap().len(), 2);
        assert_eq!(service.history("carol").unwrap().len(), 0);

        let alice = service.stats(Some("alice")).unwrap();
        assert_eq!(alice.count, 2);
        assert!(alice.average_mood.is_some());
        assert_eq!(service.stats(None).unwrap().count, 3);

        assert_eq!(service.forget("alice").unwrap(), 2);
        assert_eq!(service.stats(None).unwrap().count, 1);
    }

    #[test]
    fn test_history_newest_first() {
        let (_dir, service) = service();
        let first = service.submit("alice", "First entry of the week").unwrap();
        let second = service.submit("alice", "Second entry of the week").unwrap();

        let ids: Vec<i32> = service.history("alice").unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.record_id, first.record_id]);
    }

    #[tokio::test]
    async fn test_submit_async() {
        let (_dir, service) = service();
        let submitted = service
            .submit_async("alice".into(), "Went for a long run by the river".into())
            .await
            .unwrap();
        assert_eq!(submitted.text_preview, "Went for a long run by the river");
    }

    #[tokio::test]
    async fn test_audio_without_transcriber_is_internal_error() {
        let (_dir, service) = service();
        let err = service
            .submit_audio("alice".into(), vec![1, 2, 3], "audio/wav")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Internal(_)));
    }

    #[tokio::test]
    async fn test_unreachable_transcriber_is_unintelligible() {
        let transcriber =
            HttpTranscriber::new("http://127.0.0.1:9/transcribe", Duration::from_secs(2)).unwrap();
        let (_dir, service) = service_with(Analyzer::offline(), Some(transcriber));

        let err = service
            .submit_audio("alice".into(), vec![1, 2, 3], "audio/wav")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Rejected(Filter::Unintelligible)));

        let err = service.transcribe(Vec::new(), "audio/wav").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Rejected(Filter::Unintelligible)));
        assert_eq!(service.stats(None).unwrap().count, 0);
    }
}
