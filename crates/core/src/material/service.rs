//! Material service implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::MaterialError;
use super::types::{Attachment, AttachmentInput, CourseMaterial, NewCourseMaterial};
use crate::storage::{StagedUpload, StorageError, StorageService, StoredFile};

/// Repository trait for material persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait MaterialRepository: Send + Sync {
    /// Check if a course exists.
    fn course_exists(
        &self,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, MaterialError>> + Send;

    /// Find the material record of a course.
    fn find_by_course(
        &self,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<CourseMaterial>, MaterialError>> + Send;

    /// Create a material record.
    ///
    /// Returns `AlreadyExists` if the course already has one.
    fn create(
        &self,
        input: NewCourseMaterial,
    ) -> impl std::future::Future<Output = Result<CourseMaterial, MaterialError>> + Send;

    /// Persist the attachment list of an existing record.
    fn save(
        &self,
        material: CourseMaterial,
    ) -> impl std::future::Future<Output = Result<CourseMaterial, MaterialError>> + Send;

    /// Delete the material record of a course.
    fn delete_by_course(
        &self,
        course_id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, MaterialError>> + Send;
}

/// Object storage as seen by the material service.
pub trait ObjectStore: Send + Sync {
    /// Move a staged payload into storage.
    fn upload(
        &self,
        course_id: Uuid,
        staged: StagedUpload,
    ) -> impl std::future::Future<Output = Result<StoredFile, StorageError>> + Send;

    /// Delete a stored object by id.
    fn destroy(
        &self,
        object_id: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

impl ObjectStore for StorageService {
    async fn upload(&self, course_id: Uuid, staged: StagedUpload) -> Result<StoredFile, StorageError> {
        self.transfer(course_id, staged).await
    }

    async fn destroy(&self, object_id: &str) -> Result<(), StorageError> {
        self.delete(object_id).await
    }
}

/// Material service for managing course materials and their attachments.
pub struct MaterialService<R: MaterialRepository, S: ObjectStore> {
    repo: Arc<R>,
    store: Arc<S>,
}

impl<R: MaterialRepository, S: ObjectStore> MaterialService<R, S> {
    /// Create a new material service.
    #[must_use]
    pub fn new(repo: Arc<R>, store: Arc<S>) -> Self {
        Self { repo, store }
    }

    async fn require_course(&self, course_id: Uuid) -> Result<(), MaterialError> {
        if self.repo.course_exists(course_id).await? {
            Ok(())
        } else {
            Err(MaterialError::CourseNotFound(course_id))
        }
    }

    async fn require_material(&self, course_id: Uuid) -> Result<CourseMaterial, MaterialError> {
        self.require_course(course_id).await?;
        self.repo
            .find_by_course(course_id)
            .await?
            .ok_or(MaterialError::MaterialNotFound(course_id))
    }

    async fn store(
        &self,
        course_id: Uuid,
        payload: Option<StagedUpload>,
    ) -> Result<Option<StoredFile>, MaterialError> {
        match payload {
            Some(staged) => Ok(Some(self.store.upload(course_id, staged).await?)),
            None => Ok(None),
        }
    }

    /// Check that a material record could be created for a course.
    ///
    /// Run before staging a payload so invalid requests are refused without
    /// reading the upload.
    ///
    /// # Errors
    ///
    /// Returns `CourseNotFound` or `AlreadyExists`.
    pub async fn ensure_creatable(&self, course_id: Uuid) -> Result<(), MaterialError> {
        self.require_course(course_id).await?;
        if self.repo.find_by_course(course_id).await?.is_some() {
            return Err(MaterialError::AlreadyExists(course_id));
        }
        Ok(())
    }

    /// Check that a course has a material record and, if given, the attachment.
    ///
    /// # Errors
    ///
    /// Returns `CourseNotFound`, `MaterialNotFound` or `AttachmentNotFound`.
    pub async fn ensure_exists(
        &self,
        course_id: Uuid,
        attachment_id: Option<Uuid>,
    ) -> Result<(), MaterialError> {
        let material = self.require_material(course_id).await?;
        match attachment_id {
            Some(id) if material.position(id).is_none() => {
                Err(MaterialError::AttachmentNotFound(id))
            }
            _ => Ok(()),
        }
    }

    /// Create the material record of a course.
    ///
    /// Without a title the record starts empty. With a title it starts with
    /// one attachment, whose file is stored only when both a description and a
    /// payload were given; otherwise the payload is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Course does not exist
    /// - Course already has a material record
    /// - The payload is rejected or the storage upload fails
    /// - Database operation fails
    pub async fn create_material(
        &self,
        course_id: Uuid,
        input: AttachmentInput,
    ) -> Result<CourseMaterial, MaterialError> {
        self.ensure_creatable(course_id).await?;

        let AttachmentInput {
            title,
            description,
            payload,
        } = input;

        let mut attachments = Vec::new();
        if let Some(title) = title {
            let payload = if description.is_some() {
                payload
            } else {
                if payload.is_some() {
                    debug!(course_id = %course_id, "Payload without description discarded");
                }
                None
            };
            let file = self.store(course_id, payload).await?;
            attachments.push(Attachment::new(Some(title), description, file));
        } else if payload.is_some() {
            debug!(course_id = %course_id, "Payload without title discarded");
        }

        let material = self
            .repo
            .create(NewCourseMaterial {
                course_id,
                attachments,
            })
            .await?;

        info!(
            course_id = %course_id,
            material_id = %material.id,
            attachments = material.attachments.len(),
            "Course material created"
        );

        Ok(material)
    }

    /// Delete the material record of a course.
    ///
    /// Stored objects referenced by its attachments stay in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the course or its material record is missing, or
    /// the database operation fails.
    pub async fn delete_material(&self, course_id: Uuid) -> Result<(), MaterialError> {
        let material = self.require_material(course_id).await?;

        self.repo.delete_by_course(course_id).await?;

        let orphaned: Vec<&str> = material
            .attachments
            .iter()
            .filter_map(|a| a.file.as_ref().map(|f| f.object_id.as_str()))
            .collect();
        if !orphaned.is_empty() {
            warn!(
                course_id = %course_id,
                objects = ?orphaned,
                "Course material deleted; stored objects left in place"
            );
        }

        info!(course_id = %course_id, "Course material deleted");
        Ok(())
    }

    /// Append an attachment to the material record of a course.
    ///
    /// Any combination of title, description and payload is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Course or material record does not exist
    /// - The payload is rejected or the storage upload fails
    /// - Database operation fails
    pub async fn upload_attachment(
        &self,
        course_id: Uuid,
        input: AttachmentInput,
    ) -> Result<Attachment, MaterialError> {
        let mut material = self.require_material(course_id).await?;

        let file = self.store(course_id, input.payload).await?;
        let attachment = Attachment::new(input.title, input.description, file);

        material.attachments.push(attachment.clone());
        self.repo.save(material).await?;

        info!(
            course_id = %course_id,
            attachment_id = %attachment.id,
            has_file = attachment.file.is_some(),
            "Attachment uploaded"
        );

        Ok(attachment)
    }

    /// List the attachments of a course in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the course or its material record is missing, or
    /// the database operation fails.
    pub async fn list_attachments(&self, course_id: Uuid) -> Result<Vec<Attachment>, MaterialError> {
        Ok(self.require_material(course_id).await?.attachments)
    }

    /// Get one attachment of a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the course, material record or attachment is
    /// missing, or the database operation fails.
    pub async fn get_attachment(
        &self,
        course_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<Attachment, MaterialError> {
        self.require_material(course_id)
            .await?
            .attachment(attachment_id)
            .cloned()
            .ok_or(MaterialError::AttachmentNotFound(attachment_id))
    }

    /// Update an attachment in place.
    ///
    /// Present fields overwrite; absent ones are left alone. A new payload
    /// replaces the file reference, and the previous object stays in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Course, material record or attachment does not exist
    /// - The payload is rejected or the storage upload fails
    /// - Database operation fails
    pub async fn update_attachment(
        &self,
        course_id: Uuid,
        attachment_id: Uuid,
        input: AttachmentInput,
    ) -> Result<Attachment, MaterialError> {
        let mut material = self.require_material(course_id).await?;
        let index = material
            .position(attachment_id)
            .ok_or(MaterialError::AttachmentNotFound(attachment_id))?;

        let file = self.store(course_id, input.payload).await?;

        let attachment = &mut material.attachments[index];
        if let Some(file) = file {
            if let Some(previous) = attachment.file.replace(file) {
                warn!(
                    course_id = %course_id,
                    attachment_id = %attachment_id,
                    object_id = %previous.object_id,
                    "File replaced; previous stored object left in place"
                );
            }
        }
        if let Some(title) = input.title {
            attachment.title = Some(title);
        }
        if let Some(description) = input.description {
            attachment.description = Some(description);
        }
        let updated = attachment.clone();

        self.repo.save(material).await?;

        info!(
            course_id = %course_id,
            attachment_id = %attachment_id,
            "Attachment updated"
        );

        Ok(updated)
    }

    /// Delete an attachment.
    ///
    /// The stored object is deleted first; if that fails the attachment is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Course, material record or attachment does not exist
    /// - Storage deletion fails
    /// - Database operation fails
    pub async fn delete_attachment(
        &self,
        course_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<(), MaterialError> {
        let mut material = self.require_material(course_id).await?;
        let index = material
            .position(attachment_id)
            .ok_or(MaterialError::AttachmentNotFound(attachment_id))?;

        if let Some(file) = &material.attachments[index].file {
            self.store.destroy(&file.object_id).await?;
        }

        material.attachments.remove(index);
        self.repo.save(material).await?;

        info!(
            course_id = %course_id,
            attachment_id = %attachment_id,
            "Attachment deleted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StagingArea;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    type EventLog = Arc<Mutex<Vec<String>>>;

    /// Mock repository for testing.
    struct MockMaterialRepository {
        courses: Mutex<HashSet<Uuid>>,
        materials: Mutex<HashMap<Uuid, CourseMaterial>>,
        events: EventLog,
    }

    impl MockMaterialRepository {
        fn new(events: EventLog) -> Self {
            Self {
                courses: Mutex::new(HashSet::new()),
                materials: Mutex::new(HashMap::new()),
                events,
            }
        }

        fn add_course(&self) -> Uuid {
            let id = Uuid::new_v4();
            self.courses.lock().unwrap().insert(id);
            id
        }

        fn stored(&self, course_id: Uuid) -> Option<CourseMaterial> {
            self.materials.lock().unwrap().get(&course_id).cloned()
        }
    }

    impl MaterialRepository for MockMaterialRepository {
        async fn course_exists(&self, course_id: Uuid) -> Result<bool, MaterialError> {
            Ok(self.courses.lock().unwrap().contains(&course_id))
        }

        async fn find_by_course(
            &self,
            course_id: Uuid,
        ) -> Result<Option<CourseMaterial>, MaterialError> {
            Ok(self.stored(course_id))
        }

        async fn create(&self, input: NewCourseMaterial) -> Result<CourseMaterial, MaterialError> {
            let mut materials = self.materials.lock().unwrap();
            if materials.contains_key(&input.course_id) {
                return Err(MaterialError::AlreadyExists(input.course_id));
            }
            let material = CourseMaterial {
                id: Uuid::new_v4(),
                course_id: input.course_id,
                attachments: input.attachments,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            materials.insert(material.course_id, material.clone());
            Ok(material)
        }

        async fn save(&self, material: CourseMaterial) -> Result<CourseMaterial, MaterialError> {
            self.events.lock().unwrap().push("save".to_string());
            self.materials
                .lock()
                .unwrap()
                .insert(material.course_id, material.clone());
            Ok(material)
        }

        async fn delete_by_course(&self, course_id: Uuid) -> Result<bool, MaterialError> {
            Ok(self.materials.lock().unwrap().remove(&course_id).is_some())
        }
    }

    /// Mock object store recording calls.
    struct MockObjectStore {
        events: EventLog,
        fail_destroy: bool,
    }

    impl ObjectStore for MockObjectStore {
        async fn upload(
            &self,
            course_id: Uuid,
            staged: StagedUpload,
        ) -> Result<StoredFile, StorageError> {
            let object_id = format!("materials/{course_id}/{}", Uuid::new_v4());
            self.events
                .lock()
                .unwrap()
                .push(format!("upload:{}", staged.filename()));
            Ok(StoredFile {
                url: format!("https://files.example.com/{object_id}"),
                object_id,
                content_type: staged.content_type().to_string(),
                filename: staged.filename().to_string(),
            })
        }

        async fn destroy(&self, object_id: &str) -> Result<(), StorageError> {
            self.events
                .lock()
                .unwrap()
                .push(format!("destroy:{object_id}"));
            if self.fail_destroy {
                Err(StorageError::operation("provider unavailable"))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        service: MaterialService<MockMaterialRepository, MockObjectStore>,
        repo: Arc<MockMaterialRepository>,
        events: EventLog,
        staging: StagingArea,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_failing_destroy(false)
        }

        fn with_failing_destroy(fail_destroy: bool) -> Self {
            let events: EventLog = Arc::new(Mutex::new(Vec::new()));
            let repo = Arc::new(MockMaterialRepository::new(events.clone()));
            let store = Arc::new(MockObjectStore {
                events: events.clone(),
                fail_destroy,
            });
            let dir = tempfile::tempdir().expect("tempdir");
            Self {
                service: MaterialService::new(repo.clone(), store),
                repo,
                events,
                staging: StagingArea::new(dir.path(), 1024 * 1024),
                _dir: dir,
            }
        }

        async fn payload(&self, filename: &str) -> StagedUpload {
            self.staging
                .stage_bytes(b"%PDF-1.7", "application/pdf", filename)
                .await
                .expect("stage")
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        async fn course_with_material(&self) -> Uuid {
            let course_id = self.repo.add_course();
            self.service
                .create_material(course_id, AttachmentInput::default())
                .await
                .expect("create material");
            course_id
        }
    }

    fn text(title: &str) -> Option<String> {
        Some(title.to_string())
    }

    #[tokio::test]
    async fn test_every_operation_requires_course() {
        let h = Harness::new();
        let course_id = Uuid::new_v4();
        let attachment_id = Uuid::new_v4();

        let results = [
            h.service
                .create_material(course_id, AttachmentInput::default())
                .await
                .err(),
            h.service.delete_material(course_id).await.err(),
            h.service
                .upload_attachment(course_id, AttachmentInput::default())
                .await
                .err(),
            h.service.list_attachments(course_id).await.err(),
            h.service
                .get_attachment(course_id, attachment_id)
                .await
                .err(),
            h.service
                .update_attachment(course_id, attachment_id, AttachmentInput::default())
                .await
                .err(),
            h.service
                .delete_attachment(course_id, attachment_id)
                .await
                .err(),
        ];

        for result in results {
            assert!(matches!(result, Some(MaterialError::CourseNotFound(id)) if id == course_id));
        }
    }

    #[tokio::test]
    async fn test_operations_require_material() {
        let h = Harness::new();
        let course_id = h.repo.add_course();

        let result = h.service.list_attachments(course_id).await;
        assert!(matches!(result, Err(MaterialError::MaterialNotFound(_))));

        let result = h
            .service
            .upload_attachment(course_id, AttachmentInput::default())
            .await;
        assert!(matches!(result, Err(MaterialError::MaterialNotFound(_))));

        let result = h.service.delete_material(course_id).await;
        assert!(matches!(result, Err(MaterialError::MaterialNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_without_title_is_empty() {
        let h = Harness::new();
        let course_id = h.repo.add_course();

        let material = h
            .service
            .create_material(course_id, AttachmentInput::default())
            .await
            .expect("create");

        assert_eq!(material.course_id, course_id);
        assert!(material.attachments.is_empty());
    }

    #[tokio::test]
    async fn test_create_twice_conflicts_and_keeps_record() {
        let h = Harness::new();
        let course_id = h.repo.add_course();

        let first = h
            .service
            .create_material(course_id, AttachmentInput::new(text("Week 1"), None, None))
            .await
            .expect("create");

        let payload = h.payload("late.pdf").await;
        let result = h
            .service
            .create_material(
                course_id,
                AttachmentInput::new(text("Other"), text("desc"), Some(payload)),
            )
            .await;

        assert!(matches!(result, Err(MaterialError::AlreadyExists(id)) if id == course_id));
        assert_eq!(h.repo.stored(course_id), Some(first));
        assert!(h.events().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_title_description_and_payload_stores_file() {
        let h = Harness::new();
        let course_id = h.repo.add_course();
        let payload = h.payload("syllabus.pdf").await;

        let material = h
            .service
            .create_material(
                course_id,
                AttachmentInput::new(text("Syllabus"), text("Course outline"), Some(payload)),
            )
            .await
            .expect("create");

        assert_eq!(material.attachments.len(), 1);
        let attachment = &material.attachments[0];
        assert_eq!(attachment.title.as_deref(), Some("Syllabus"));
        assert_eq!(attachment.description.as_deref(), Some("Course outline"));
        let file = attachment.file.as_ref().expect("file stored");
        assert_eq!(file.filename, "syllabus.pdf");
        assert_eq!(file.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_create_without_description_discards_payload() {
        let h = Harness::new();
        let course_id = h.repo.add_course();
        let payload = h.payload("syllabus.pdf").await;
        let temp_path = payload.path().to_path_buf();

        let material = h
            .service
            .create_material(
                course_id,
                AttachmentInput::new(text("Syllabus"), None, Some(payload)),
            )
            .await
            .expect("create");

        assert_eq!(material.attachments.len(), 1);
        assert!(material.attachments[0].file.is_none());
        assert!(h.events().is_empty());
        assert!(!temp_path.exists());
    }

    #[tokio::test]
    async fn test_upload_payload_only_attaches_file() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        let payload = h.payload("notes.pdf").await;

        let attachment = h
            .service
            .upload_attachment(course_id, AttachmentInput::new(None, None, Some(payload)))
            .await
            .expect("upload");

        assert!(attachment.title.is_none());
        assert!(attachment.description.is_none());
        assert_eq!(
            attachment.file.as_ref().map(|f| f.filename.as_str()),
            Some("notes.pdf")
        );
    }

    #[tokio::test]
    async fn test_upload_then_get_roundtrip() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        let payload = h.payload("week2.pdf").await;

        let uploaded = h
            .service
            .upload_attachment(
                course_id,
                AttachmentInput::new(text("Week 2"), text("Loops"), Some(payload)),
            )
            .await
            .expect("upload");

        let fetched = h
            .service
            .get_attachment(course_id, uploaded.id)
            .await
            .expect("get");
        assert_eq!(fetched, uploaded);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;

        let mut ids = Vec::new();
        for title in ["one", "two", "three"] {
            let attachment = h
                .service
                .upload_attachment(course_id, AttachmentInput::new(text(title), None, None))
                .await
                .expect("upload");
            ids.push(attachment.id);
        }

        let listed: Vec<Uuid> = h
            .service
            .list_attachments(course_id)
            .await
            .expect("list")
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_get_unknown_attachment() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;

        let result = h.service.get_attachment(course_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(MaterialError::AttachmentNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_title_only_keeps_file_and_description() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        let payload = h.payload("lab.pdf").await;
        let original = h
            .service
            .upload_attachment(
                course_id,
                AttachmentInput::new(text("Lab"), text("First lab"), Some(payload)),
            )
            .await
            .expect("upload");

        let updated = h
            .service
            .update_attachment(
                course_id,
                original.id,
                AttachmentInput::new(text("Lab 1"), None, None),
            )
            .await
            .expect("update");

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.title.as_deref(), Some("Lab 1"));
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.file, original.file);
    }

    #[tokio::test]
    async fn test_update_with_payload_replaces_file_without_remote_delete() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        let first = h.payload("v1.pdf").await;
        let original = h
            .service
            .upload_attachment(course_id, AttachmentInput::new(text("Notes"), None, Some(first)))
            .await
            .expect("upload");

        let second = h.payload("v2.pdf").await;
        let updated = h
            .service
            .update_attachment(
                course_id,
                original.id,
                AttachmentInput::new(None, None, Some(second)),
            )
            .await
            .expect("update");

        let file = updated.file.expect("file");
        assert_eq!(file.filename, "v2.pdf");
        assert_ne!(Some(file.object_id), original.file.map(|f| f.object_id));
        assert!(!h.events().iter().any(|e| e.starts_with("destroy:")));

        let stored = h.repo.stored(course_id).expect("material");
        assert_eq!(stored.attachments.len(), 1);
        assert_eq!(stored.attachments[0].title.as_deref(), Some("Notes"));
    }

    #[tokio::test]
    async fn test_update_unknown_attachment() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;

        let result = h
            .service
            .update_attachment(
                course_id,
                Uuid::new_v4(),
                AttachmentInput::new(text("x"), None, None),
            )
            .await;
        assert!(matches!(result, Err(MaterialError::AttachmentNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_attachment_destroys_object_before_save() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        let keep = h
            .service
            .upload_attachment(course_id, AttachmentInput::new(text("keep"), None, None))
            .await
            .expect("upload");
        let payload = h.payload("drop.pdf").await;
        let removed = h
            .service
            .upload_attachment(course_id, AttachmentInput::new(text("drop"), None, Some(payload)))
            .await
            .expect("upload");
        let object_id = removed.file.as_ref().expect("file").object_id.clone();
        h.events.lock().unwrap().clear();

        h.service
            .delete_attachment(course_id, removed.id)
            .await
            .expect("delete");

        assert_eq!(
            h.events(),
            vec![format!("destroy:{object_id}"), "save".to_string()]
        );
        let remaining = h.service.list_attachments(course_id).await.expect("list");
        assert_eq!(remaining, vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_attachment_remote_failure_keeps_attachment() {
        let h = Harness::with_failing_destroy(true);
        let course_id = h.course_with_material().await;
        let payload = h.payload("slides.pdf").await;
        let attachment = h
            .service
            .upload_attachment(course_id, AttachmentInput::new(text("Slides"), None, Some(payload)))
            .await
            .expect("upload");

        let result = h.service.delete_attachment(course_id, attachment.id).await;

        assert!(matches!(result, Err(MaterialError::Storage(_))));
        let stored = h.repo.stored(course_id).expect("material");
        assert_eq!(stored.attachments, vec![attachment]);
    }

    #[tokio::test]
    async fn test_delete_unknown_attachment_leaves_list_unchanged() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        h.service
            .upload_attachment(course_id, AttachmentInput::new(text("only"), None, None))
            .await
            .expect("upload");

        let result = h.service.delete_attachment(course_id, Uuid::new_v4()).await;

        assert!(matches!(result, Err(MaterialError::AttachmentNotFound(_))));
        assert_eq!(h.repo.stored(course_id).expect("material").attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_attachment_without_file_skips_remote() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        let attachment = h
            .service
            .upload_attachment(course_id, AttachmentInput::new(text("link"), None, None))
            .await
            .expect("upload");
        h.events.lock().unwrap().clear();

        h.service
            .delete_attachment(course_id, attachment.id)
            .await
            .expect("delete");

        assert_eq!(h.events(), vec!["save".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_material_leaves_objects() {
        let h = Harness::new();
        let course_id = h.course_with_material().await;
        let payload = h.payload("a.pdf").await;
        h.service
            .upload_attachment(course_id, AttachmentInput::new(None, None, Some(payload)))
            .await
            .expect("upload");

        h.service.delete_material(course_id).await.expect("delete");

        assert!(h.repo.stored(course_id).is_none());
        assert!(!h.events().iter().any(|e| e.starts_with("destroy:")));
    }

    #[tokio::test]
    async fn test_preflight_checks() {
        let h = Harness::new();
        let course_id = h.repo.add_course();

        assert!(h.service.ensure_creatable(course_id).await.is_ok());
        assert!(matches!(
            h.service.ensure_exists(course_id, None).await,
            Err(MaterialError::MaterialNotFound(_))
        ));

        h.service
            .create_material(course_id, AttachmentInput::default())
            .await
            .expect("create");

        assert!(matches!(
            h.service.ensure_creatable(course_id).await,
            Err(MaterialError::AlreadyExists(_))
        ));
        assert!(h.service.ensure_exists(course_id, None).await.is_ok());
        assert!(matches!(
            h.service.ensure_exists(course_id, Some(Uuid::new_v4())).await,
            Err(MaterialError::AttachmentNotFound(_))
        ));
    }
}
