use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::domain::commands::institutions::{
    CreateInstitutionCommand, InstitutionWithCount, UpdateInstitutionCommand,
};
use crate::domain::models::institution::MAX_INSTITUTION_NAME_LEN;
use crate::domain::models::{Institution, InstitutionValidationError, RecordError};
use crate::storage::{CadetStorage, Connection, InstitutionStorage};

/// Service for managing institutions
#[derive(Clone)]
pub struct InstitutionService<C: Connection> {
    institutions: C::InstitutionRepository,
    cadets: C::CadetRepository,
}

impl<C: Connection> InstitutionService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            institutions: connection.create_institution_repository(),
            cadets: connection.create_cadet_repository(),
        }
    }

    pub async fn create_institution(
        &self,
        command: CreateInstitutionCommand,
    ) -> Result<InstitutionWithCount> {
        info!("Creating institution: {}", command.name);

        let name = validate_name(&command.name)?;
        let officer_name = validate_officer_name(&command.officer_name)?;
        self.ensure_name_available(&name, None).await?;

        let now = Utc::now();
        let institution = Institution {
            id: Institution::generate_id(),
            name,
            officer_name,
            created_at: now,
            updated_at: now,
        };
        self.institutions.store_institution(&institution).await?;

        info!("Created institution {} with ID {}", institution.name, institution.id);
        Ok(InstitutionWithCount {
            institution,
            cadet_count: 0,
        })
    }

    pub async fn get_institution(&self, institution_id: &str) -> Result<Option<InstitutionWithCount>> {
        match self.institutions.get_institution(institution_id).await? {
            Some(institution) => Ok(Some(self.with_count(institution).await?)),
            None => {
                warn!("Institution not found: {}", institution_id);
                Ok(None)
            }
        }
    }

    /// All institutions ordered by name, each with a freshly computed cadet count
    pub async fn list_institutions(&self) -> Result<Vec<InstitutionWithCount>> {
        let institutions = self.institutions.list_institutions().await?;
        let mut listed = Vec::with_capacity(institutions.len());
        for institution in institutions {
            listed.push(self.with_count(institution).await?);
        }
        info!("Listed {} institutions", listed.len());
        Ok(listed)
    }

    /// Rename or reassign the officer. Cadets reference the institution by
    /// id, so a rename never detaches them.
    pub async fn update_institution(
        &self,
        institution_id: &str,
        command: UpdateInstitutionCommand,
    ) -> Result<InstitutionWithCount> {
        info!("Updating institution: {}", institution_id);

        let mut institution = self
            .institutions
            .get_institution(institution_id)
            .await?
            .ok_or_else(|| RecordError::institution_not_found(institution_id))?;

        if let Some(name) = command.name {
            let name = validate_name(&name)?;
            self.ensure_name_available(&name, Some(institution_id)).await?;
            institution.name = name;
        }
        if let Some(officer_name) = command.officer_name {
            institution.officer_name = validate_officer_name(&officer_name)?;
        }
        institution.updated_at = Utc::now();

        self.institutions.update_institution(&institution).await?;
        self.with_count(institution).await
    }

    async fn with_count(&self, institution: Institution) -> Result<InstitutionWithCount> {
        let cadet_count = self.cadets.count_cadets(&institution.id).await?;
        Ok(InstitutionWithCount {
            institution,
            cadet_count,
        })
    }

    async fn ensure_name_available(&self, name: &str, except_id: Option<&str>) -> Result<()> {
        let wanted = name.to_lowercase();
        let taken = self
            .institutions
            .list_institutions()
            .await?
            .into_iter()
            .any(|i| i.name.to_lowercase() == wanted && Some(i.id.as_str()) != except_id);
        if taken {
            return Err(RecordError::Conflict(format!("An institution named '{}' already exists", name)).into());
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, InstitutionValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InstitutionValidationError::EmptyName);
    }
    if name.chars().count() > MAX_INSTITUTION_NAME_LEN {
        return Err(InstitutionValidationError::NameTooLong);
    }
    Ok(name.to_string())
}

fn validate_officer_name(officer_name: &str) -> Result<String, InstitutionValidationError> {
    let officer_name = officer_name.trim();
    if officer_name.chars().count() > MAX_INSTITUTION_NAME_LEN {
        return Err(InstitutionValidationError::OfficerNameTooLong);
    }
    Ok(officer_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::file::test_utils::{sample_cadet, TestEnvironment};
    use crate::storage::FileConnection;

    fn setup_test(env: &TestEnvironment) -> InstitutionService<FileConnection> {
        InstitutionService::new(&env.connection)
    }

    fn create_command(name: &str) -> CreateInstitutionCommand {
        CreateInstitutionCommand {
            name: name.to_string(),
            officer_name: "Capt. S. Meena".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_institution() {
        let env = TestEnvironment::new().unwrap();
        let service = setup_test(&env);

        let created = service
            .create_institution(create_command("  Bishop Heber College  "))
            .await
            .unwrap();

        assert_eq!(created.institution.name, "Bishop Heber College");
        assert!(created.institution.id.starts_with("institution::"));
        assert_eq!(created.cadet_count, 0);
    }

    #[tokio::test]
    async fn test_create_institution_validation() {
        let env = TestEnvironment::new().unwrap();
        let service = setup_test(&env);

        let err = service.create_institution(create_command("   ")).await.unwrap_err();
        assert!(err.downcast_ref::<InstitutionValidationError>().is_some());

        let err = service
            .create_institution(create_command(&"x".repeat(121)))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InstitutionValidationError>(),
            Some(InstitutionValidationError::NameTooLong)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_a_conflict() {
        let env = TestEnvironment::new().unwrap();
        let service = setup_test(&env);
        service.create_institution(create_command("National College")).await.unwrap();

        let err = service
            .create_institution(create_command("national college"))
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<RecordError>(), Some(RecordError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cadet_count_is_computed_on_read() {
        let env = TestEnvironment::new().unwrap();
        let service = setup_test(&env);
        let created = service.create_institution(create_command("National College")).await.unwrap();
        let id = created.institution.id.clone();

        let cadets = env.connection.create_cadet_repository();
        cadets.store_cadet(&sample_cadet(&id, "R1", "Arun")).await.unwrap();
        cadets.store_cadet(&sample_cadet(&id, "R2", "Bala")).await.unwrap();

        let fetched = service.get_institution(&id).await.unwrap().unwrap();
        assert_eq!(fetched.cadet_count, 2);

        let listed = service.list_institutions().await.unwrap();
        assert_eq!(listed[0].cadet_count, 2);
    }

    #[tokio::test]
    async fn test_rename_keeps_cadets_attached() {
        let env = TestEnvironment::new().unwrap();
        let service = setup_test(&env);
        let created = service.create_institution(create_command("Old Name College")).await.unwrap();
        let id = created.institution.id.clone();
        env.connection
            .create_cadet_repository()
            .store_cadet(&sample_cadet(&id, "R1", "Arun"))
            .await
            .unwrap();

        let renamed = service
            .update_institution(
                &id,
                UpdateInstitutionCommand {
                    name: Some("New Name College".to_string()),
                    officer_name: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(renamed.institution.id, id);
        assert_eq!(renamed.institution.name, "New Name College");
        assert_eq!(renamed.institution.officer_name, "Capt. S. Meena");
        assert_eq!(renamed.cadet_count, 1);
    }

    #[tokio::test]
    async fn test_update_nonexistent_institution() {
        let env = TestEnvironment::new().unwrap();
        let service = setup_test(&env);

        let err = service
            .update_institution("institution::missing", UpdateInstitutionCommand::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecordError>(),
            Some(RecordError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_missing_institution_is_none() {
        let env = TestEnvironment::new().unwrap();
        let service = setup_test(&env);
        assert!(service.get_institution("institution::missing").await.unwrap().is_none());
    }
}
