use shared::{
    CreateInstitutionRequest, Institution as SharedInstitution, InstitutionListResponse,
    InstitutionResponse, UpdateInstitutionRequest,
};

use crate::domain::commands::institutions::{
    CreateInstitutionCommand, InstitutionWithCount, UpdateInstitutionCommand,
};

/// Mapper between shared institution DTOs and domain types
pub struct InstitutionMapper;

impl InstitutionMapper {
    pub fn to_create_command(request: CreateInstitutionRequest) -> CreateInstitutionCommand {
        CreateInstitutionCommand {
            name: request.name,
            officer_name: request.officer_name,
        }
    }

    pub fn to_update_command(request: UpdateInstitutionRequest) -> UpdateInstitutionCommand {
        UpdateInstitutionCommand {
            name: request.name,
            officer_name: request.officer_name,
        }
    }

    pub fn to_dto(domain: InstitutionWithCount) -> SharedInstitution {
        let InstitutionWithCount {
            institution,
            cadet_count,
        } = domain;
        SharedInstitution {
            id: institution.id,
            name: institution.name,
            officer_name: institution.officer_name,
            cadet_count,
            created_at: institution.created_at.to_rfc3339(),
            updated_at: institution.updated_at.to_rfc3339(),
        }
    }

    pub fn to_response(domain: InstitutionWithCount, success_message: &str) -> InstitutionResponse {
        InstitutionResponse {
            institution: Self::to_dto(domain),
            success_message: success_message.to_string(),
        }
    }

    pub fn to_list_response(domain: Vec<InstitutionWithCount>) -> InstitutionListResponse {
        InstitutionListResponse {
            institutions: domain.into_iter().map(Self::to_dto).collect(),
        }
    }
}
