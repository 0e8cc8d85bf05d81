//! Conversions between the cadet DTOs of the `shared` crate and domain types.
//!
//! Enumerations travel as codes on the wire ("SGT", "ATC", "B Certificate");
//! an unknown code fails the conversion with a `CadetValidationError`.

use shared::{
    Cadet as SharedCadet, CadetDetails, CadetListRequest, CadetListResponse,
    Camp as SharedCamp, Certificate as SharedCertificate, CreateCadetRequest,
    PaginationInfo as SharedPaginationInfo, UpdateCadetRequest,
};

use crate::domain::commands::cadets::{
    CadetListQuery, CadetListResult, CreateCadetCommand, UpdateCadetCommand,
};
use crate::domain::models::{
    Cadet, CadetValidationError, Camp, CampType, Certificate, CertificateType, Division,
    PersonalDetails, Rank,
};

pub struct CadetMapper;

impl CadetMapper {
    pub fn to_create_command(
        institution_id: &str,
        request: CreateCadetRequest,
    ) -> Result<CreateCadetCommand, CadetValidationError> {
        Ok(CreateCadetCommand {
            institution_id: institution_id.to_string(),
            reg_no: request.reg_no,
            name: request.name,
            rank: request.rank.as_deref().map(parse_rank).transpose()?,
            batch: request.batch,
            details: details_to_domain(request.details),
            camps: camps_to_domain(request.camps)?,
            certificates: certificates_to_domain(request.certificates)?,
        })
    }

    pub fn to_update_command(request: UpdateCadetRequest) -> Result<UpdateCadetCommand, CadetValidationError> {
        Ok(UpdateCadetCommand {
            reg_no: request.reg_no,
            name: request.name,
            rank: request.rank.as_deref().map(parse_rank).transpose()?,
            batch: request.batch,
            details: request.details.map(details_to_domain),
            camps: request.camps.map(camps_to_domain).transpose()?,
            certificates: request.certificates.map(certificates_to_domain).transpose()?,
        })
    }

    pub fn to_list_query(
        institution_id: &str,
        request: CadetListRequest,
    ) -> Result<CadetListQuery, CadetValidationError> {
        let division = match request.division.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(code) => Some(
                Division::from_code(code)
                    .ok_or_else(|| CadetValidationError::UnknownDivision(code.to_string()))?,
            ),
        };
        let rank = match request.rank.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(code) => Some(parse_rank(code)?),
        };
        Ok(CadetListQuery {
            institution_id: institution_id.to_string(),
            search: request.search,
            rank,
            batch: request.batch,
            division,
            after: request.after,
            limit: request.limit,
        })
    }

    pub fn to_dto(domain: Cadet) -> SharedCadet {
        SharedCadet {
            id: domain.id,
            institution_id: domain.institution_id,
            reg_no: domain.reg_no,
            name: domain.name,
            rank: domain.rank.code().to_string(),
            batch: domain.batch,
            division: domain.division.map(|d| d.code().to_string()),
            details: details_to_dto(domain.details),
            camps: domain.camps.into_iter().map(camp_to_dto).collect(),
            certificates: domain
                .certificates
                .into_iter()
                .map(|c| SharedCertificate {
                    certificate_type: c.certificate_type.label().to_string(),
                    grade: c.grade,
                    year: c.year,
                })
                .collect(),
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_list_response(result: CadetListResult) -> CadetListResponse {
        CadetListResponse {
            cadets: result.cadets.into_iter().map(Self::to_dto).collect(),
            pagination: SharedPaginationInfo {
                has_more: result.pagination.has_more,
                next_cursor: result.pagination.next_cursor,
            },
            total: result.total,
        }
    }
}

fn parse_rank(value: &str) -> Result<Rank, CadetValidationError> {
    Rank::parse(value).ok_or_else(|| CadetValidationError::UnknownRank(value.to_string()))
}

fn camps_to_domain(camps: Vec<SharedCamp>) -> Result<Vec<Camp>, CadetValidationError> {
    camps
        .into_iter()
        .map(|camp| -> Result<Camp, CadetValidationError> {
            let camp_type = CampType::from_code(&camp.camp_type)
                .ok_or_else(|| CadetValidationError::UnknownCampType(camp.camp_type.clone()))?;
            Ok(Camp {
                camp_type,
                level: camp.level,
                location: camp.location,
                start_date: camp.start_date,
                end_date: camp.end_date,
                duration_days: camp.duration_days,
                reward: camp.reward,
                certificate_url: camp.certificate_url,
            })
        })
        .collect()
}

fn camp_to_dto(camp: Camp) -> SharedCamp {
    SharedCamp {
        camp_type: camp.camp_type.code().to_string(),
        level: camp.level,
        location: camp.location,
        start_date: camp.start_date,
        end_date: camp.end_date,
        duration_days: camp.duration_days,
        reward: camp.reward,
        certificate_url: camp.certificate_url,
    }
}

fn certificates_to_domain(
    certificates: Vec<SharedCertificate>,
) -> Result<Vec<Certificate>, CadetValidationError> {
    certificates
        .into_iter()
        .map(|c| -> Result<Certificate, CadetValidationError> {
            let certificate_type = CertificateType::parse(&c.certificate_type).ok_or_else(|| {
                CadetValidationError::UnknownCertificateType(c.certificate_type.clone())
            })?;
            Ok(Certificate {
                certificate_type,
                grade: c.grade,
                year: c.year,
            })
        })
        .collect()
}

fn details_to_domain(dto: CadetDetails) -> PersonalDetails {
    PersonalDetails {
        gender: dto.gender,
        dob: dto.dob,
        mobile: dto.mobile,
        email: dto.email,
        blood_group: dto.blood_group,
        home_address: dto.home_address,
        nok_name: dto.nok_name,
        nok_relation: dto.nok_relation,
        nok_contact: dto.nok_contact,
        adhaar: dto.adhaar,
        education: dto.education,
        sports_culturals: dto.sports_culturals,
    }
}

fn details_to_dto(domain: PersonalDetails) -> CadetDetails {
    CadetDetails {
        gender: domain.gender,
        dob: domain.dob,
        mobile: domain.mobile,
        email: domain.email,
        blood_group: domain.blood_group,
        home_address: domain.home_address,
        nok_name: domain.nok_name,
        nok_relation: domain.nok_relation,
        nok_contact: domain.nok_contact,
        adhaar: domain.adhaar,
        education: domain.education,
        sports_culturals: domain.sports_culturals,
    }
}
