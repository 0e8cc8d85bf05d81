//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod institutions {
    use crate::domain::models::Institution;

    #[derive(Debug, Clone)]
    pub struct CreateInstitutionCommand {
        pub name: String,
        pub officer_name: String,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateInstitutionCommand {
        pub name: Option<String>,
        pub officer_name: Option<String>,
    }

    /// An institution together with its cadet count, computed at read time.
    #[derive(Debug, Clone, PartialEq)]
    pub struct InstitutionWithCount {
        pub institution: Institution,
        pub cadet_count: usize,
    }
}

pub mod cadets {
    use crate::domain::models::{Cadet, Camp, Certificate, Division, PersonalDetails, Rank};

    /// Input for creating a new cadet.
    #[derive(Debug, Clone)]
    pub struct CreateCadetCommand {
        pub institution_id: String,
        pub reg_no: String,
        pub name: String,
        pub rank: Option<Rank>,
        pub batch: i32,
        pub details: PersonalDetails,
        pub camps: Vec<Camp>,
        pub certificates: Vec<Certificate>,
    }

    /// Partial update; `None` leaves the stored value untouched.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateCadetCommand {
        pub reg_no: Option<String>,
        pub name: Option<String>,
        pub rank: Option<Rank>,
        pub batch: Option<i32>,
        pub details: Option<PersonalDetails>,
        pub camps: Option<Vec<Camp>>,
        pub certificates: Option<Vec<Certificate>>,
    }

    /// Query parameters for listing the cadets of one institution.
    #[derive(Debug, Clone, Default)]
    pub struct CadetListQuery {
        pub institution_id: String,
        pub search: Option<String>,
        pub rank: Option<Rank>,
        pub batch: Option<i32>,
        pub division: Option<Division>,
        pub after: Option<String>,
        pub limit: Option<u32>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct PaginationInfo {
        pub has_more: bool,
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CadetListResult {
        pub cadets: Vec<Cadet>,
        pub pagination: PaginationInfo,
        pub total: usize,
    }
}
