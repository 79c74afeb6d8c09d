use async_trait::async_trait;
use shared::{
    domain::{Student, StudentFields, StudentId, STUDENT_OBJECT},
    error::{ErrorCode, RemoteFailure},
};
use storage::Storage;

use crate::RemoteStore;

fn internal(err: anyhow::Error) -> RemoteFailure {
    RemoteFailure::internal(format!("{err:#}"))
}

#[async_trait]
impl RemoteStore for Storage {
    async fn create(
        &self,
        object_type: &str,
        fields: &StudentFields,
    ) -> Result<StudentId, RemoteFailure> {
        if object_type != STUDENT_OBJECT {
            return Err(RemoteFailure::new(
                ErrorCode::Validation,
                format!("unsupported object type '{object_type}'"),
            ));
        }
        self.create_student(fields).await.map_err(internal)
    }

    async fn update(&self, record: &Student) -> Result<(), RemoteFailure> {
        match self.update_student(record).await.map_err(internal)? {
            true => Ok(()),
            false => Err(RemoteFailure::not_found(format!(
                "student {} does not exist",
                record.id()
            ))),
        }
    }

    async fn delete(&self, id: &StudentId) -> Result<(), RemoteFailure> {
        match self.delete_student(id).await.map_err(internal)? {
            true => Ok(()),
            false => Err(RemoteFailure::not_found(format!(
                "student {id} does not exist"
            ))),
        }
    }
}
