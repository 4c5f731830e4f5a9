//! Board mutations.
//!
//! [`BoardService::execute`] checks a [`BoardCommand`]'s precondition
//! against the current snapshot, asks for confirmation where needed, issues
//! a single store write (after the image upload, if any) and refreshes the
//! snapshot. Failures are returned and also published as the board's
//! visible error; the snapshot itself is left as it was.

pub mod command;
pub mod upload;

use std::sync::Arc;

use chrono::Utc;

pub use command::{
    AlwaysConfirm, BoardCommand, CommandOutcome, Confirm, NeverConfirm, PERMANENT_DELETE_PROMPT,
    SOFT_DELETE_PROMPT,
};
pub use upload::{object_name, upload_image};

use crate::board::{bucket_of, Bucket};
use crate::error::{BoardError, Result, ValidationError};
use crate::gateway::GatewayHandle;
use crate::model::{NewWorkRequest, RequestDraft, RequestPatch, WorkRequest};
use crate::sync::BoardFetcher;

pub struct BoardService {
    gateway: GatewayHandle,
    fetcher: Arc<BoardFetcher>,
    creators: Vec<String>,
}

impl BoardService {
    pub fn new(fetcher: Arc<BoardFetcher>, creators: Vec<String>) -> Self {
        Self {
            gateway: Arc::clone(fetcher.gateway()),
            fetcher,
            creators,
        }
    }

    pub fn fetcher(&self) -> &Arc<BoardFetcher> {
        &self.fetcher
    }

    pub async fn execute(&self, command: BoardCommand, confirm: &dyn Confirm) -> Result<CommandOutcome> {
        let label = command.to_string();
        match self.apply(command, confirm).await {
            Ok(CommandOutcome::Applied(id)) => {
                log::info!("Applied {} (request {})", label, id);
                self.fetcher.refresh_now().await;
                Ok(CommandOutcome::Applied(id))
            }
            Ok(CommandOutcome::Declined) => {
                log::debug!("{} declined", label);
                Ok(CommandOutcome::Declined)
            }
            Err(e) => {
                log::warn!("{} failed: {}", label, e);
                self.fetcher.record_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn apply(&self, command: BoardCommand, confirm: &dyn Confirm) -> Result<CommandOutcome> {
        let prompt = command.confirmation_prompt();
        let confirmed = || prompt.map_or(true, |p| confirm.confirm(p));
        let now = Utc::now();

        let (id, patch) = match command {
            BoardCommand::Create(draft) => return self.create(&draft).await,
            BoardCommand::Edit { id, draft } => {
                self.target(id).await?;
                (id, self.edit_patch(&draft).await?)
            }
            BoardCommand::Complete(id) => {
                let row = self.target(id).await?;
                require(&row, &[Bucket::InProgress], "complete")?;
                let patch = RequestPatch {
                    completed: Some(true),
                    is_urgent: Some(false),
                    updated_at: Some(now),
                    ..Default::default()
                };
                (id, patch)
            }
            BoardCommand::Recover(id) => {
                let row = self.target(id).await?;
                require(&row, &[Bucket::Completed], "recover")?;
                let patch = RequestPatch {
                    completed: Some(false),
                    ..Default::default()
                };
                (id, patch)
            }
            BoardCommand::SoftDelete(id) => {
                let row = self.target(id).await?;
                require(&row, &[Bucket::InProgress, Bucket::Completed], "soft-delete")?;
                if !confirmed() {
                    return Ok(CommandOutcome::Declined);
                }
                let patch = RequestPatch {
                    is_deleted: Some(true),
                    deleted_at: Some(now),
                    ..Default::default()
                };
                (id, patch)
            }
            BoardCommand::PermanentDelete(id) => {
                let row = self.target(id).await?;
                require(&row, &[Bucket::Completed, Bucket::Deleted], "permanent-delete")?;
                if !confirmed() {
                    return Ok(CommandOutcome::Declined);
                }
                self.gateway.delete(id).await?;
                return Ok(CommandOutcome::Applied(id));
            }
            BoardCommand::MoveOutOfHolding(id) => {
                let row = self.target(id).await?;
                if !row.just_upload() {
                    return Err(ValidationError::NotJustUpload(id).into());
                }
                let patch = RequestPatch {
                    is_just_upload: Some(false),
                    ..Default::default()
                };
                (id, patch)
            }
            BoardCommand::ToggleWorkDone(id) => {
                let row = self.target(id).await?;
                let patch = RequestPatch {
                    is_work_done: Some(!row.work_done()),
                    ..Default::default()
                };
                (id, patch)
            }
            BoardCommand::SetCheckMarks { id, marks } => {
                self.target(id).await?;
                let patch = RequestPatch {
                    check_marks: Some(marks),
                    ..Default::default()
                };
                (id, patch)
            }
        };

        self.gateway.update(id, &patch).await?;
        Ok(CommandOutcome::Applied(id))
    }

    async fn create(&self, draft: &RequestDraft) -> Result<CommandOutcome> {
        let pickup_date = draft.validate(&self.creators)?;
        let image_url = self.image_url_for(draft).await?;
        let row = self
            .gateway
            .insert(&NewWorkRequest::from_draft(draft, pickup_date, image_url))
            .await?;
        Ok(CommandOutcome::Applied(row.id))
    }

    async fn edit_patch(&self, draft: &RequestDraft) -> Result<RequestPatch> {
        let pickup_date = draft.validate(&self.creators)?;
        let image_url = self.image_url_for(draft).await?;
        Ok(RequestPatch {
            company: Some(draft.company.clone()),
            program: Some(draft.program.clone()),
            pickup_date: Some(pickup_date),
            note: Some(draft.note.clone()),
            image_url: Some(image_url),
            is_urgent: Some(draft.is_urgent),
            is_just_upload: Some(draft.is_just_upload),
            creator: Some(draft.creator.clone()),
            ..Default::default()
        })
    }

    /// Uploads the draft's new image, or keeps its existing URL.
    async fn image_url_for(&self, draft: &RequestDraft) -> Result<Option<String>> {
        match &draft.image {
            Some(image) => {
                let millis = Utc::now().timestamp_millis();
                Ok(Some(upload_image(self.gateway.as_ref(), image, millis).await?))
            }
            None => Ok(draft.image_url.clone()),
        }
    }

    /// Looks the row up in the snapshot, refetching once on a miss.
    async fn target(&self, id: i64) -> Result<WorkRequest> {
        if let Some(row) = self.fetcher.find(id) {
            return Ok(row);
        }
        self.fetcher.refresh_now().await;
        self.fetcher
            .find(id)
            .ok_or_else(|| BoardError::from(ValidationError::NotFound(id)))
    }
}

fn require(row: &WorkRequest, allowed: &[Bucket], operation: &'static str) -> Result<()> {
    let bucket = bucket_of(row);
    if allowed.contains(&bucket) {
        Ok(())
    } else {
        Err(ValidationError::WrongBucket {
            id: row.id,
            bucket,
            operation,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetentionConfig;
    use crate::gateway::{RecordGateway, SqliteGateway};
    use crate::model::ImageUpload;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    async fn service() -> (BoardService, Arc<SqliteGateway>) {
        let gateway = Arc::new(SqliteGateway::open_in_memory().unwrap());
        let fetcher = Arc::new(BoardFetcher::new(gateway.clone(), RetentionConfig::default()));
        fetcher.refresh().await;
        let creators = crate::config::default_creators();
        (BoardService::new(fetcher, creators), gateway)
    }

    async fn create(service: &BoardService, draft: RequestDraft) -> i64 {
        match service
            .execute(BoardCommand::Create(draft), &AlwaysConfirm)
            .await
            .unwrap()
        {
            CommandOutcome::Applied(id) => id,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let (service, gateway) = service().await;
        let draft = RequestDraft {
            company: "ACME".to_string(),
            ..Default::default()
        };
        let err = service
            .execute(BoardCommand::Create(draft), &AlwaysConfirm)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Validation(ValidationError::MissingField { field: "program" })
        ));
        assert!(gateway.fetch_all().await.unwrap().is_empty());
        assert!(service.fetcher().snapshot().error.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_creator() {
        let (service, _) = service().await;
        let draft = RequestDraft {
            creator: "Nobody".to_string(),
            ..RequestDraft::new("ACME", "Banner", today())
        };
        let err = service
            .execute(BoardCommand::Create(draft), &AlwaysConfirm)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Validation(ValidationError::UnknownCreator(_))
        ));
    }

    #[tokio::test]
    async fn test_create_with_image_stores_public_url() {
        let (service, gateway) = service().await;
        let draft = RequestDraft {
            image: Some(ImageUpload::from_file_name("My Scan.png", vec![1, 2, 3])),
            ..RequestDraft::new("ACME", "Banner", today())
        };
        let id = create(&service, draft).await;
        let row = service.fetcher().find(id).unwrap();
        let url = row.image_url.unwrap();
        assert!(url.starts_with("local://objects/request-images/"));
        assert!(url.ends_with("_My_Scan.png"));
        let name = url.rsplit('/').next().unwrap();
        assert!(gateway.object(name).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_complete_rejects_completed_row() {
        let (service, _) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        service
            .execute(BoardCommand::Complete(id), &AlwaysConfirm)
            .await
            .unwrap();
        let err = service
            .execute(BoardCommand::Complete(id), &AlwaysConfirm)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Validation(ValidationError::WrongBucket {
                bucket: Bucket::Completed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_recover_only_from_completed() {
        let (service, _) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        assert!(service
            .execute(BoardCommand::Recover(id), &AlwaysConfirm)
            .await
            .is_err());

        service
            .execute(BoardCommand::Complete(id), &AlwaysConfirm)
            .await
            .unwrap();
        service
            .execute(BoardCommand::Recover(id), &AlwaysConfirm)
            .await
            .unwrap();
        assert!(!service.fetcher().find(id).unwrap().completed);

        service
            .execute(BoardCommand::SoftDelete(id), &AlwaysConfirm)
            .await
            .unwrap();
        assert!(service
            .execute(BoardCommand::Recover(id), &AlwaysConfirm)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_declined_delete_has_no_effect() {
        let (service, _) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        let outcome = service
            .execute(BoardCommand::SoftDelete(id), &NeverConfirm)
            .await
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Declined);
        assert!(!service.fetcher().find(id).unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_permanent_delete_requires_completed_or_deleted() {
        let (service, gateway) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        assert!(service
            .execute(BoardCommand::PermanentDelete(id), &AlwaysConfirm)
            .await
            .is_err());

        service
            .execute(BoardCommand::SoftDelete(id), &AlwaysConfirm)
            .await
            .unwrap();
        service
            .execute(BoardCommand::PermanentDelete(id), &AlwaysConfirm)
            .await
            .unwrap();
        assert!(gateway.fetch_all().await.unwrap().is_empty());
        assert!(service.fetcher().find(id).is_none());
    }

    #[tokio::test]
    async fn test_move_out_of_holding() {
        let (service, _) = service().await;
        let parked = create(
            &service,
            RequestDraft {
                is_just_upload: true,
                ..RequestDraft::new("ACME", "Banner", today())
            },
        )
        .await;
        assert_eq!(bucket_of(&service.fetcher().find(parked).unwrap()), Bucket::JustUpload);

        service
            .execute(BoardCommand::MoveOutOfHolding(parked), &AlwaysConfirm)
            .await
            .unwrap();
        assert_eq!(bucket_of(&service.fetcher().find(parked).unwrap()), Bucket::InProgress);

        let err = service
            .execute(BoardCommand::MoveOutOfHolding(parked), &AlwaysConfirm)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Validation(ValidationError::NotJustUpload(_))
        ));
    }

    #[tokio::test]
    async fn test_toggle_work_done_is_independent_of_completed() {
        let (service, _) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        service
            .execute(BoardCommand::ToggleWorkDone(id), &AlwaysConfirm)
            .await
            .unwrap();
        let row = service.fetcher().find(id).unwrap();
        assert!(row.work_done());
        assert!(!row.completed);

        service
            .execute(BoardCommand::ToggleWorkDone(id), &AlwaysConfirm)
            .await
            .unwrap();
        assert!(!service.fetcher().find(id).unwrap().work_done());
    }

    #[tokio::test]
    async fn test_edit_keeps_status() {
        let (service, _) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        let mut draft = RequestDraft::from_request(&service.fetcher().find(id).unwrap());
        draft.program = "Poster".to_string();
        draft.note = "matte".to_string();
        draft.creator = "김한별".to_string();
        service
            .execute(BoardCommand::Edit { id, draft }, &AlwaysConfirm)
            .await
            .unwrap();

        let row = service.fetcher().find(id).unwrap();
        assert_eq!(row.program, "Poster");
        assert_eq!(row.note.as_deref(), Some("matte"));
        assert_eq!(row.creator.as_deref(), Some("김한별"));
        assert!(row.is_active());
    }

    #[tokio::test]
    async fn test_set_check_marks() {
        let (service, _) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        let marks = vec![crate::model::CheckMark { x: 0.25, y: 0.5 }];
        service
            .execute(
                BoardCommand::SetCheckMarks {
                    id,
                    marks: marks.clone(),
                },
                &AlwaysConfirm,
            )
            .await
            .unwrap();
        assert_eq!(service.fetcher().find(id).unwrap().check_marks, Some(marks));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (service, _) = service().await;
        let err = service
            .execute(BoardCommand::Complete(999), &AlwaysConfirm)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Validation(ValidationError::NotFound(999))
        ));
    }

    #[derive(Default)]
    struct RecordingConfirm(std::sync::Mutex<Vec<String>>);

    impl Confirm for RecordingConfirm {
        fn confirm(&self, prompt: &str) -> bool {
            self.0.lock().unwrap().push(prompt.to_string());
            false
        }
    }

    #[tokio::test]
    async fn test_destructive_commands_ask_their_prompt() {
        let (service, _) = service().await;
        let id = create(&service, RequestDraft::new("ACME", "Banner", today())).await;
        service
            .execute(BoardCommand::Complete(id), &AlwaysConfirm)
            .await
            .unwrap();

        let confirm = RecordingConfirm::default();
        for command in [BoardCommand::SoftDelete(id), BoardCommand::PermanentDelete(id)] {
            let outcome = service.execute(command, &confirm).await.unwrap();
            assert_eq!(outcome, CommandOutcome::Declined);
        }
        service
            .execute(BoardCommand::Recover(id), &confirm)
            .await
            .unwrap();

        let asked = confirm.0.lock().unwrap().clone();
        assert_eq!(asked, vec![SOFT_DELETE_PROMPT, PERMANENT_DELETE_PROMPT]);
    }
}

